//! Status and error banners shown above the transcript.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Banner {
    AwaitingApiKey,
    UploadHint,
    AwaitingUpload,
    UploadSucceeded(String),
    UnsupportedFileType,
    SessionExpired,
    LoadFailed(String),
    ModelFailed(String),
}

impl Banner {
    pub fn level(&self) -> BannerLevel {
        match self {
            Banner::UploadHint | Banner::AwaitingUpload => BannerLevel::Info,
            Banner::UploadSucceeded(_) => BannerLevel::Success,
            Banner::AwaitingApiKey | Banner::SessionExpired => BannerLevel::Warning,
            Banner::UnsupportedFileType | Banner::LoadFailed(_) | Banner::ModelFailed(_) => {
                BannerLevel::Error
            }
        }
    }

    pub fn text(&self) -> String {
        match self {
            Banner::AwaitingApiKey => "Anthropic API 키를 입력하세요.".to_string(),
            Banner::UploadHint => {
                "📁 아래 입력창에 파일 경로를 입력하여 파일을 업로드하세요.".to_string()
            }
            Banner::AwaitingUpload => "파일을 업로드해주세요.".to_string(),
            Banner::UploadSucceeded(name) => {
                format!("'{}' 파일이 성공적으로 업로드되었습니다! ✅", name)
            }
            Banner::UnsupportedFileType => "지원하지 않는 파일 형식입니다❎".to_string(),
            Banner::SessionExpired => {
                "⚠️ 세션이 만료되었습니다. 파일을 다시 업로드해주세요.".to_string()
            }
            Banner::LoadFailed(e) => format!("파일을 읽는 중 오류가 발생했습니다: {}", e),
            Banner::ModelFailed(e) => format!("응답 생성 중 오류가 발생했습니다: {}", e),
        }
    }
}

impl fmt::Display for Banner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}
