//! Media file downloading.

use std::path::Path;

use futures::StreamExt;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::api::TwitterApi;
use crate::error::{Error, Result};

/// Stream `url` into a file at `output_path`, returning the bytes written.
///
/// The body is written chunk by chunk as it arrives. The file is only created
/// once the server has answered with a success status. A transfer that fails
/// midway leaves the partial file in place.
pub async fn download_to_file(api: &TwitterApi, url: &str, output_path: &Path) -> Result<u64> {
    let response = api.download_file(url).await?;

    let mut file = File::create(output_path).await?;
    let mut stream = response.bytes_stream();
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| Error::Download(format!("Stream error: {}", e)))?;
        file.write_all(&chunk).await?;
        downloaded += chunk.len() as u64;
    }

    file.flush().await?;

    tracing::debug!("Wrote {} bytes to {}", downloaded, output_path.display());

    Ok(downloaded)
}
