fn main() -> anyhow::Result<()> {
    let args = std::env::args().collect::<Vec<_>>();

    cargondk::cli::run(args)
}
