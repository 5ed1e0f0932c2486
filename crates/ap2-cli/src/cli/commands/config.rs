use ap2_core::Ap2Config;

use crate::exit_codes::SUCCESS;

pub fn run(config: &Ap2Config) -> anyhow::Result<i32> {
    print!("{}", config.to_yaml()?);
    Ok(SUCCESS)
}
