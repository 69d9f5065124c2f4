use std::path::Path;

pub fn run(root: &Path, port: u16, open_browser: bool) -> anyhow::Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(ideaboard_server::serve(
        root.to_path_buf(),
        port,
        open_browser,
    ))
}
