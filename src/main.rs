use anyhow::Result;

fn main() -> Result<()> {
    ctfdump::main_sync(std::env::args(), std::env::current_dir()?)
}
