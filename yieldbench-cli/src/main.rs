fn main() -> anyhow::Result<()> {
    yieldbench_cli::run()
}
