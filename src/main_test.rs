use std::fs;
use std::io::Write;

use anyhow::Result;

use super::log_writer;

#[test]
fn it_flushes_logs_when_the_guard_drops() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let (mut writer, guard) = log_writer(&dir.path().to_string_lossy());

    writer.write_all(b"{\"message\":\"exchange finished\"}\n")?;
    drop(guard);

    let contents = fs::read_to_string(dir.path().join("debug.log"))?;
    assert_eq!(contents, "{\"message\":\"exchange finished\"}\n");
    return Ok(());
}
