use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    acronyms::example_apps::run_lookup_demo(std::env::args().skip(1))
}
