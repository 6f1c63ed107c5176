//! External video search links for an exercise's search term

use clap::ValueEnum;

/// Where the link will be opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Platform {
    Android,
    Ios,
    #[default]
    Desktop,
}

const TIKTOK_PACKAGE: &str = "com.zhiliaoapp.musically";

/// TikTok search for `term`.
///
/// Android gets an intent URL that opens the app and falls back to the web
/// search when it is not installed. iOS universal links handle the plain URL.
pub fn tiktok_search_url(term: &str, platform: Platform) -> String {
    let term = urlencoding::encode(term);
    let web_url = format!("https://www.tiktok.com/search?q={}", term);

    match platform {
        Platform::Android => format!(
            "intent://search?q={}#Intent;scheme=tiktok;package={};S.browser_fallback_url={};end",
            term, TIKTOK_PACKAGE, web_url
        ),
        Platform::Ios | Platform::Desktop => web_url,
    }
}

/// Embedded YouTube player showing the first search result
pub fn youtube_embed_url(term: &str) -> String {
    format!(
        "https://www.youtube.com/embed?listType=search&list={}&autoplay=1",
        urlencoding::encode(term)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_desktop_and_ios_use_web_url() {
        let url = tiktok_search_url("Squat technique", Platform::Desktop);
        assert_eq!(url, "https://www.tiktok.com/search?q=Squat%20technique");
        assert_eq!(tiktok_search_url("Squat technique", Platform::Ios), url);
    }

    #[test]
    fn test_android_intent() {
        let url = tiktok_search_url("Leg press", Platform::Android);
        assert!(url.starts_with("intent://search?q=Leg%20press#Intent;scheme=tiktok;"));
        assert!(url.contains("package=com.zhiliaoapp.musically"));
        assert!(
            url.ends_with("S.browser_fallback_url=https://www.tiktok.com/search?q=Leg%20press;end")
        );
    }

    #[test]
    fn test_youtube_encodes_term() {
        assert_eq!(
            youtube_embed_url("Rosca & Tríceps"),
            "https://www.youtube.com/embed?listType=search&list=Rosca%20%26%20Tr%C3%ADceps&autoplay=1"
        );
    }
}
