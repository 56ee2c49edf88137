use cairn_core::Repository;

#[derive(clap::Args, Debug)]
pub struct ConfigArgs {
    /// A `section.field` key, e.g. `user.name`.
    pub key: String,
    /// The value to set; omit to print the current value instead.
    pub value: Option<String>,
}

pub fn exec(repo: &Repository, args: &ConfigArgs) -> anyhow::Result<i32> {
    if let Some(value) = &args.value {
        repo.config().set(&args.key, value)?;
        return Ok(0);
    }

    let value = match args.key.as_str() {
        "user.name" => repo.config().user_name()?,
        "user.email" => repo.config().user_email()?,
        other => anyhow::bail!("unrecognized config key `{}`", other),
    };
    println!("{}", value);
    Ok(0)
}
