fn main() -> anyhow::Result<()> {
    company_search::run()
}
