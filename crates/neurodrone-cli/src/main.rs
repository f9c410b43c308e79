mod command;
mod corridor;
mod schema;
mod util;

fn main() -> anyhow::Result<()> {
    command::run()
}
