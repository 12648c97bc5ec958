use std::io::Write;

/// Prompt and read one line from stdin. Blocking; run it off the runtime.
pub fn readline() -> Result<String, String> {
    write!(std::io::stdout(), "> ").map_err(|e| e.to_string())?;
    std::io::stdout().flush().map_err(|e| e.to_string())?;
    let mut buffer = String::new();
    let read = std::io::stdin()
        .read_line(&mut buffer)
        .map_err(|e| e.to_string())?;
    if read == 0 {
        return Err("end of input".to_string());
    }
    Ok(buffer)
}

pub async fn readline_async() -> Result<String, String> {
    tokio::task::spawn_blocking(readline)
        .await
        .map_err(|e| e.to_string())?
}
