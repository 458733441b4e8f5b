//! Teaching tools the assistant recommends first

/// A recommended external tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecommendedTool {
    pub name: &'static str,
    pub description: &'static str,
    pub url: &'static str,
}

pub const RECOMMENDED_TOOLS: &[RecommendedTool] = &[
    RecommendedTool {
        name: "TRỢ LÝ TẠO MÔ PHỎNG TRỰC QUAN",
        description: "Ứng dụng AI hỗ trợ tạo mô phỏng trực quan vệ sinh động",
        url: "https://trolytaomophong.vercel.app/",
    },
    RecommendedTool {
        name: "TRỢ LÝ TẠO ĐỀ THI TỪ MA TRẬN",
        description: "Ứng dụng AI hỗ trợ tạo đề thi theo ma trận đặc tả dành cho GV Chuẩn GDPT 2018",
        url: "https://trolytaodethi2026.vercel.app/",
    },
    RecommendedTool {
        name: "TRỢ LÝ TẠO BÀI TẬP TOÁN CẤP",
        description: "Ứng dụng AI hỗ trợ tạo bài tập, đề thi dành cho GV các cấp học - Chuẩn GDPT 2018",
        url: "https://trolytaobaitap.vercel.app/",
    },
    RecommendedTool {
        name: "TRỢ LÝ VĂN HỌC",
        description: "Ứng dụng AI hỗ trợ toàn diện GV cấp Tiểu học, THCS & THPT - Chuẩn ma trận GDPT 2018.",
        url: "https://trolymonvan.vercel.app/",
    },
    RecommendedTool {
        name: "KẾ HOẠCH BÀI GIẢNG PRO",
        description: "Giải pháp toàn diện giúp giáo viên soạn thảo giáo án, kế hoạch bài dạy chuyên nghiệp, nhanh chóng và tuân thủ chuẩn công văn 5512.",
        url: "https://kehoachbaigiangpro.vercel.app/",
    },
    RecommendedTool {
        name: "TRỢ LÝ ẢO CHO GVCN",
        description: "Ứng dụng AI hỗ trợ GVCN nhận xét học sinh cả lớp một cách tự động và chuyên nghiệp.",
        url: "https://trolygvcn.vercel.app/",
    },
    RecommendedTool {
        name: "MAGICSCHOOL.AI",
        description: "Hơn 80+ công cụ tạo lesson plan, câu hỏi, rubric, hoạt động lớp học, trợ lý tutor cho HS.",
        url: "https://www.magicschool.ai",
    },
    RecommendedTool {
        name: "CANVA FOR EDUCATION",
        description: "Tạo slide, infographic, poster, video bài giảng; Magic Write gợi ý nội dung, có nhiều mẫu cho giáo dục.",
        url: "https://www.canva.com/education",
    },
    RecommendedTool {
        name: "QUIZIZZ",
        description: "Tạo bài kiểm tra gamified, live hoặc homework; ngân hàng đề cộng đồng; thống kê kết quả theo thời gian thực.",
        url: "https://quizizz.com",
    },
    RecommendedTool {
        name: "GEOGEBRA",
        description: "Phần mềm vẽ hình, mô phỏng hình học, đại số, xác suất trực quan.",
        url: "https://www.geogebra.org",
    },
    RecommendedTool {
        name: "NOTEBOOKLM (GOOGLE)",
        description: "Tải PDF, tài liệu, transcript video vào; AI tóm tắt, rút ý, tạo câu hỏi ôn tập cực chuẩn.",
        url: "https://notebooklm.google",
    },
];

/// Bullet list of the recommended tools, one per line
pub fn markdown_list() -> String {
    RECOMMENDED_TOOLS
        .iter()
        .map(|t| format!("- **{}**: {} (Link: {})", t.name, t.description, t.url))
        .collect::<Vec<_>>()
        .join("\n")
}
