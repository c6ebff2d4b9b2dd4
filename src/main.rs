fn main() -> miette::Result<()> {
    combilab::cli::run()
}
