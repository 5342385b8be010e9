fn main() -> marionette_ctl::error::AppResult<()> {
    marionette_ctl::run()
}
