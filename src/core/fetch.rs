use futures::StreamExt;
use regex::Regex;
use reqwest::header::{CONTENT_DISPOSITION, COOKIE, REFERER};
use reqwest::{Client, Url};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{DownloadError, NasError};
use crate::models::DownloadConfig;

/// Name used when neither the headers nor the URL suggest one
pub const FALLBACK_FILE_NAME: &str = "download";

/// What to fetch and where to put it
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub url: String,
    pub dest_dir: PathBuf,
    pub referer: Option<String>,
    pub cookie: Option<String>,
}

/// A completed download
#[derive(Debug, Clone)]
pub struct DownloadedFile {
    pub path: PathBuf,
    pub bytes: usize,
    pub attempts: u32,
}

/// Parse and validate a download URL (http and https only)
pub fn parse_url(url: &str) -> Result<Url, DownloadError> {
    let parsed = Url::parse(url).map_err(|e| DownloadError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(DownloadError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

/// Delay before retry number `retry` (1-based): linear in the retry count
pub fn backoff_delay(retry: u32, step_ms: u64) -> Duration {
    Duration::from_millis(step_ms.saturating_mul(retry as u64))
}

fn extended_filename_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?i)filename\*\s*=\s*"?([^;"]+)"?"#).unwrap())
}

fn plain_filename_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)(?:^|;)\s*filename\s*=\s*(?:"((?:[^"\\]|\\.)*)"|([^;]+))"#).unwrap()
    })
}

/// Decode an RFC 5987 `charset'language'pct-encoded` value
fn decode_extended_value(value: &str) -> Option<String> {
    let mut parts = value.trim().splitn(3, '\'');
    let charset = parts.next()?;
    let _language = parts.next()?;
    let encoded = parts.next()?;

    if charset.eq_ignore_ascii_case("iso-8859-1") {
        let bytes = urlencoding::decode_binary(encoded.as_bytes());
        return Some(bytes.iter().map(|&b| b as char).collect());
    }
    urlencoding::decode(encoded).ok().map(|s| s.into_owned())
}

/// File name from a Content-Disposition header.
///
/// The RFC 5987 `filename*=` form wins over a plain `filename=`.
pub fn filename_from_content_disposition(header: &str) -> Option<String> {
    if let Some(caps) = extended_filename_re().captures(header) {
        if let Some(name) = decode_extended_value(&caps[1]) {
            if !name.trim().is_empty() {
                return Some(name);
            }
        }
    }

    let caps = plain_filename_re().captures(header)?;
    let name = match (caps.get(1), caps.get(2)) {
        (Some(quoted), _) => quoted.as_str().replace("\\\"", "\"").replace("\\\\", "\\"),
        (None, Some(bare)) => bare.as_str().trim().to_string(),
        _ => return None,
    };
    (!name.trim().is_empty()).then_some(name)
}

/// Last non-empty path segment of a URL, percent-decoded
pub fn filename_from_url(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.filter(|s| !s.is_empty()).last()?;
    let decoded = urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string());
    (!decoded.trim().is_empty()).then_some(decoded)
}

/// Keep a server-provided name inside the destination directory
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        FALLBACK_FILE_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Pick the saved file name: Content-Disposition, then URL path, then a fixed fallback
pub fn resolve_filename(content_disposition: Option<&str>, url: &Url) -> String {
    let name = content_disposition
        .and_then(filename_from_content_disposition)
        .or_else(|| filename_from_url(url))
        .unwrap_or_else(|| FALLBACK_FILE_NAME.to_string());
    sanitize_filename(&name)
}

/// HTTP downloader with linear-backoff retries
pub struct Downloader {
    client: Client,
    config: DownloadConfig,
}

impl Downloader {
    pub fn new(config: DownloadConfig) -> Result<Self, DownloadError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| DownloadError::RequestFailed(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Fetch the URL, retrying failed attempts, and write the body to disk in one go
    pub async fn download(&self, request: &DownloadRequest) -> Result<DownloadedFile, NasError> {
        let url = parse_url(&request.url)?;
        let total_attempts = self.config.retries.saturating_add(1);

        let mut attempt = 1;
        let (content_disposition, body) = loop {
            match self.fetch_once(&url, request).await {
                Ok(result) => break result,
                Err(e) if attempt < total_attempts => {
                    let delay = backoff_delay(attempt, self.config.backoff_ms);
                    warn!(
                        "Attempt {}/{} failed: {}. Retrying in {}ms",
                        attempt,
                        total_attempts,
                        e,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    return Err(DownloadError::RetriesExhausted {
                        attempts: attempt,
                        last_error: Box::new(e),
                    }
                    .into());
                }
            }
        };

        let file_name = resolve_filename(content_disposition.as_deref(), &url);
        tokio::fs::create_dir_all(&request.dest_dir).await?;
        let path = request.dest_dir.join(&file_name);
        tokio::fs::write(&path, &body).await?;

        debug!("Wrote {} bytes after {} attempt(s)", body.len(), attempt);
        Ok(DownloadedFile {
            path,
            bytes: body.len(),
            attempts: attempt,
        })
    }

    async fn fetch_once(
        &self,
        url: &Url,
        request: &DownloadRequest,
    ) -> Result<(Option<String>, Vec<u8>), DownloadError> {
        let mut builder = self.client.get(url.clone());
        if let Some(referer) = &request.referer {
            builder = builder.header(REFERER, referer);
        }
        if let Some(cookie) = &request.cookie {
            builder = builder.header(COOKIE, cookie);
        }

        debug!("GET {}", url);
        let response = builder.send().await.map_err(|e| self.classify(e))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(DownloadError::HttpError {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string(),
            });
        }

        let content_disposition = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .map(|v| String::from_utf8_lossy(v.as_bytes()).to_string());
        if let Some(len) = response.content_length() {
            debug!("Expecting {} bytes", len);
        }

        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| self.classify(e))?;
            body.extend_from_slice(&chunk);
        }

        Ok((content_disposition, body))
    }

    fn classify(&self, err: reqwest::Error) -> DownloadError {
        if err.is_timeout() {
            DownloadError::Timeout(self.config.timeout_seconds)
        } else {
            DownloadError::from(err)
        }
    }
}

/// Resolve the destination directory: explicit `--dest`, or the working directory
pub fn destination_dir(dest: Option<&Path>, working_dir: &Path) -> PathBuf {
    match dest {
        Some(d) if d.is_absolute() => d.to_path_buf(),
        Some(d) => working_dir.join(d),
        None => working_dir.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_quoted() {
        assert_eq!(
            filename_from_content_disposition(r#"attachment; filename="cover.jpg""#).as_deref(),
            Some("cover.jpg")
        );
    }

    #[test]
    fn test_content_disposition_unquoted() {
        assert_eq!(
            filename_from_content_disposition("attachment; filename=album.zip").as_deref(),
            Some("album.zip")
        );
        assert_eq!(
            filename_from_content_disposition("attachment;filename=a b.zip; size=10").as_deref(),
            Some("a b.zip")
        );
    }

    #[test]
    fn test_content_disposition_extended_preferred() {
        let header = r#"attachment; filename="fallback.txt"; filename*=UTF-8''na%C3%AFve%20file.txt"#;
        assert_eq!(
            filename_from_content_disposition(header).as_deref(),
            Some("naïve file.txt")
        );
    }

    #[test]
    fn test_content_disposition_latin1() {
        let header = "attachment; filename*=iso-8859-1'en'caf%E9.txt";
        assert_eq!(
            filename_from_content_disposition(header).as_deref(),
            Some("café.txt")
        );
    }

    #[test]
    fn test_content_disposition_escaped_quote() {
        let header = r#"attachment; filename="say \"hi\".txt""#;
        assert_eq!(
            filename_from_content_disposition(header).as_deref(),
            Some(r#"say "hi".txt"#)
        );
    }

    #[test]
    fn test_content_disposition_without_name() {
        assert_eq!(filename_from_content_disposition("inline"), None);
        assert_eq!(filename_from_content_disposition(r#"attachment; filename="""#), None);
    }

    #[test]
    fn test_filename_from_url() {
        let url = Url::parse("https://example.com/files/My%20Album.zip?token=1").unwrap();
        assert_eq!(filename_from_url(&url).as_deref(), Some("My Album.zip"));

        let url = Url::parse("https://example.com/dir/").unwrap();
        assert_eq!(filename_from_url(&url).as_deref(), Some("dir"));

        let url = Url::parse("https://example.com/").unwrap();
        assert_eq!(filename_from_url(&url), None);
    }

    #[test]
    fn test_resolve_filename_fallbacks() {
        let url = Url::parse("https://example.com/").unwrap();
        assert_eq!(resolve_filename(None, &url), "download");

        let url = Url::parse("https://example.com/get/42").unwrap();
        assert_eq!(
            resolve_filename(Some("attachment; filename=\"../../etc/passwd\""), &url),
            ".._.._etc_passwd"
        );
    }

    #[test]
    fn test_parse_url_rejects_other_schemes() {
        assert!(parse_url("https://example.com/a").is_ok());
        assert!(matches!(
            parse_url("ftp://example.com/a"),
            Err(DownloadError::InvalidUrl { .. })
        ));
        assert!(matches!(
            parse_url("not a url"),
            Err(DownloadError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_backoff_delay_is_linear() {
        assert_eq!(backoff_delay(1, 500), Duration::from_millis(500));
        assert_eq!(backoff_delay(3, 500), Duration::from_millis(1500));
    }

    #[test]
    fn test_destination_dir() {
        let cwd = Path::new("/home/nas");
        assert_eq!(destination_dir(None, cwd), PathBuf::from("/home/nas"));
        assert_eq!(
            destination_dir(Some(Path::new("covers")), cwd),
            PathBuf::from("/home/nas/covers")
        );
        assert_eq!(
            destination_dir(Some(Path::new("/tmp/x")), cwd),
            PathBuf::from("/tmp/x")
        );
    }
}
