use chrono::NaiveDate;
use tracing::{info, warn};
use webbrowser::Browser;

use crate::skill::Score;

const TWEET_INTENT: &str = "https://twitter.com/intent/tweet?text=";

/// One-line summary of a day's result.
pub fn share_text(date: NaiveDate, language: &str, score: &Score) -> String {
    format!(
        "dailytype {date} [{language}] top {:.1}% · {:.0} wpm",
        score.percentile, score.wpm
    )
}

/// Percent-encode everything outside the RFC 3986 unreserved set.
pub fn percent_encode(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 3);
    for b in text.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

pub fn share_url(text: &str) -> String {
    format!("{TWEET_INTENT}{}", percent_encode(text))
}

pub fn can_share() -> bool {
    Browser::is_available()
}

/// Open the tweet intent in a browser. Returns false when nothing was opened.
pub fn open(date: NaiveDate, language: &str, score: &Score) -> bool {
    if !can_share() {
        return false;
    }
    let url = share_url(&share_text(date, language, score));
    match webbrowser::open(&url) {
        Ok(()) => {
            info!(%language, "result shared");
            true
        }
        Err(e) => {
            warn!(error = %e, "could not open browser");
            false
        }
    }
}
