use std::path::Path;

use crate::error::FetchError;

/// Local file name derived from an asset link: the last path segment with
/// any query or fragment stripped.
pub fn file_name(link: &str) -> String {
    let path = link.split(['?', '#']).next().unwrap_or(link);
    path.rsplit('/').next().unwrap_or(path).to_string()
}

/// Download every `;`-separated link into the media directory. Best
/// effort: a failed asset is logged and skipped, it never fails the card.
pub async fn download_all(client: &reqwest::Client, dir: &Path, links: &str) {
    for link in links.split(';').map(str::trim).filter(|l| !l.is_empty()) {
        if let Err(e) = download_one(client, dir, link).await {
            tracing::warn!("failed to download {link}: {e}");
        }
    }
}

async fn download_one(client: &reqwest::Client, dir: &Path, link: &str) -> Result<(), FetchError> {
    let response = client.get(link).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: link.to_string(),
            status: status.as_u16(),
        });
    }
    let bytes = response.bytes().await?;

    tokio::fs::create_dir_all(dir).await?;
    tokio::fs::write(dir.join(file_name(link)), &bytes).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_takes_last_segment() {
        assert_eq!(file_name("https://example.com/media/cat__gb_1.mp3"), "cat__gb_1.mp3");
        assert_eq!(file_name("https://example.com/a/b/c.jpg?width=300"), "c.jpg");
        assert_eq!(file_name("plain.mp3"), "plain.mp3");
    }
}
