//! Outbound share URL construction. Building a URL never fails; whether the
//! host manages to open it is best-effort and ignored by the caller.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::catalog::GalleryImage;

const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Supported share destinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareTarget {
    Pinterest,
    Facebook,
    Twitter,
    Email,
}

/// Host-side sink that actually opens a share URL (new tab, system mailer).
/// Returns `false` when the open was refused; callers treat that as
/// non-critical and move on.
pub trait ShareOpener: Send {
    fn open(&mut self, url: &str) -> bool;
}

impl<F> ShareOpener for F
where
    F: FnMut(&str) -> bool + Send,
{
    fn open(&mut self, url: &str) -> bool {
        self(url)
    }
}

/// Build the outbound URL for sharing `image` from `page_url`.
#[must_use]
pub fn share_url(target: ShareTarget, page_url: &str, image: &GalleryImage) -> String {
    let page = utf8_percent_encode(page_url, QUERY_VALUE);
    match target {
        ShareTarget::Pinterest => {
            let media = absolute_image_url(page_url, &image.src);
            format!(
                "https://pinterest.com/pin/create/button/?url={page}&media={}&description={}",
                utf8_percent_encode(&media, QUERY_VALUE),
                utf8_percent_encode(&image.alt, QUERY_VALUE),
            )
        }
        ShareTarget::Facebook => {
            format!("https://www.facebook.com/sharer/sharer.php?u={page}")
        }
        ShareTarget::Twitter => format!(
            "https://twitter.com/intent/tweet?url={page}&text={}",
            utf8_percent_encode(&image.alt, QUERY_VALUE),
        ),
        ShareTarget::Email => format!(
            "mailto:?subject={}&body={page}",
            utf8_percent_encode(&image.alt, QUERY_VALUE),
        ),
    }
}

/// Join a site-relative image path onto the origin of `page_url`. A path that
/// is already absolute passes through unchanged.
fn absolute_image_url(page_url: &str, src: &str) -> String {
    if src.contains("://") {
        return src.to_string();
    }
    let origin = match page_url.find("://") {
        Some(scheme_end) => {
            let after = &page_url[scheme_end + 3..];
            match after.find('/') {
                Some(path_start) => &page_url[..scheme_end + 3 + path_start],
                None => page_url,
            }
        }
        None => page_url,
    };
    format!("{}{}", origin.trim_end_matches('/'), src)
}
