use skiff_athena::AthenaConfig;

use crate::cli::CliArgs;

/// Build the Athena config from the environment, then apply flag overrides.
///
/// Precedence per key: command-line flag, `{PROFILE}_ATHENA_*`, `ATHENA_*`,
/// built-in default.
pub fn resolve(args: &CliArgs) -> AthenaConfig {
    let base = match args.profile.as_deref() {
        Some(profile) => AthenaConfig::from_env_profiled(&profile.to_uppercase()),
        None => AthenaConfig::from_env(),
    };
    apply_overrides(base, args)
}

fn apply_overrides(mut config: AthenaConfig, args: &CliArgs) -> AthenaConfig {
    if let Some(ref database) = args.database {
        config.database = database.clone();
    }
    if let Some(ref region) = args.region {
        config.region = Some(region.clone());
    }
    if let Some(ref workgroup) = args.workgroup {
        config.workgroup = Some(workgroup.clone());
    }
    config
}
