use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use svcreds_engine::{CredentialResolver, LocalConfig, load_local_config, load_local_config_from_path};
use svcreds_types::{CredentialFilter, CredentialMap, CredentialQuery, InstanceFilter, NamePattern, RequestParams};
use svcreds_util::redact_credentials;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Resolve service credentials from the platform environment.
#[derive(Parser, Debug)]
#[command(name = "svcreds", version, about)]
struct Cli {
    /// Print credential values without redaction
    #[arg(long, global = true)]
    show_secrets: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Look up credentials by service name, plan, instance name and tag
    Get(GetArgs),
    /// Look up credentials with a structured instance filter
    Find(FindArgs),
    /// Resolve starter-kit credentials, consulting the local credentials file first
    Starter(StarterArgs),
    /// Merge credentials bound into request parameters
    Bind(BindArgs),
}

#[derive(Args, Debug)]
struct GetArgs {
    /// Service name; matches catalog keys by normalized prefix
    service: Option<String>,

    #[arg(long)]
    plan: Option<String>,

    /// Instance name, compared case-insensitively
    #[arg(long)]
    instance: Option<String>,

    #[arg(long)]
    tag: Option<String>,
}

#[derive(Args, Debug)]
struct FindArgs {
    /// Exact service name
    #[arg(long, conflicts_with = "service_regex")]
    service: Option<String>,

    /// Regular expression searched for in service names
    #[arg(long)]
    service_regex: Option<String>,

    /// Instance criterion as FIELD=VALUE; VALUE is read as JSON when it parses, else as text
    #[arg(long = "instance-field", value_name = "FIELD=VALUE", value_parser = parse_instance_field)]
    instance_fields: Vec<(String, Value)>,
}

#[derive(Args, Debug)]
struct StarterArgs {
    service: String,

    /// Local credentials file; defaults to the configured location when it exists
    #[arg(long)]
    local_config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct BindArgs {
    service: String,

    /// Alias the credential bundle is keyed under
    #[arg(long)]
    alt_name: Option<String>,

    /// Request parameters as a JSON object
    #[arg(long)]
    params: String,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let resolver = CredentialResolver::from_process_env();

    let output = match cli.command {
        Command::Get(args) => run_get(&resolver, args).into_value(),
        Command::Find(args) => run_find(&resolver, args)?.into_value(),
        Command::Starter(args) => run_starter(&resolver, args)?.into_value(),
        Command::Bind(args) => run_bind(&resolver, args)?.into_value(),
    };

    let output = if cli.show_secrets { output } else { redact_credentials(&output) };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run_get(resolver: &CredentialResolver, args: GetArgs) -> CredentialMap {
    let mut query = CredentialQuery::new();
    if let Some(service) = args.service {
        query = query.service(service);
    }
    if let Some(plan) = args.plan {
        query = query.plan(plan);
    }
    if let Some(instance) = args.instance {
        query = query.instance_name(instance);
    }
    if let Some(tag) = args.tag {
        query = query.tag(tag);
    }
    resolver.get_credentials(&query)
}

fn run_find(resolver: &CredentialResolver, args: FindArgs) -> Result<CredentialMap> {
    let mut filter = CredentialFilter::new().instance(args.instance_fields.into_iter().collect::<InstanceFilter>());
    if let Some(service) = args.service {
        filter = filter.service(service);
    }
    if let Some(pattern) = args.service_regex {
        let regex = NamePattern::regex(&pattern).with_context(|| format!("invalid service regex '{pattern}'"))?;
        filter = filter.service(regex);
    }
    debug!(?filter, "Finding credentials");
    Ok(resolver.find_credentials(Some(&filter)))
}

fn run_starter(resolver: &CredentialResolver, args: StarterArgs) -> Result<CredentialMap> {
    let local_config = read_local_config(args.local_config)?;
    Ok(resolver.get_credentials_for_starter(&args.service, local_config.as_ref()))
}

fn read_local_config(path: Option<PathBuf>) -> Result<Option<LocalConfig>> {
    let Some(path) = path else {
        return load_local_config().context("failed to load local credentials");
    };
    if !path.exists() {
        bail!("local credentials file {} does not exist", path.display());
    }
    load_local_config_from_path(&path).with_context(|| format!("failed to load local credentials from {}", path.display()))
}

fn run_bind(resolver: &CredentialResolver, args: BindArgs) -> Result<RequestParams> {
    let params: Value = serde_json::from_str(&args.params).context("--params is not valid JSON")?;
    let Value::Object(params) = params else {
        bail!("--params must be a JSON object");
    };
    let params = RequestParams::from_object(params);
    Ok(resolver.get_credentials_from_service_bind(&params, &args.service, args.alt_name.as_deref()))
}

fn parse_instance_field(raw: &str) -> Result<(String, Value), String> {
    let (field, value) = raw.split_once('=').ok_or_else(|| format!("expected FIELD=VALUE, got '{raw}'"))?;
    let field = field.trim();
    if field.is_empty() {
        return Err(format!("missing field name in '{raw}'"));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((field.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use serde_json::json;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn instance_field_values_prefer_json() {
        assert_eq!(parse_instance_field("plan=standard").unwrap(), ("plan".to_string(), json!("standard")));
        assert_eq!(parse_instance_field("tags=[\"eu\",\"gold\"]").unwrap(), ("tags".to_string(), json!(["eu", "gold"])));
        assert_eq!(parse_instance_field("port=443").unwrap(), ("port".to_string(), json!(443)));
        assert_eq!(parse_instance_field("name=a=b").unwrap(), ("name".to_string(), json!("a=b")));
        assert!(parse_instance_field("plan").is_err());
        assert!(parse_instance_field("=standard").is_err());
    }

    #[test]
    fn find_arguments_parse() {
        let cli = Cli::try_parse_from([
            "svcreds",
            "find",
            "--service-regex",
            "^object",
            "--instance-field",
            "tags=eu",
            "--instance-field",
            "plan=standard",
        ])
        .unwrap();
        let Command::Find(args) = cli.command else {
            panic!("expected find");
        };
        assert_eq!(args.service_regex.as_deref(), Some("^object"));
        assert_eq!(args.instance_fields.len(), 2);
    }

    #[test]
    fn service_and_regex_conflict() {
        assert!(Cli::try_parse_from(["svcreds", "find", "--service", "a", "--service-regex", "b"]).is_err());
    }

    #[test]
    fn bind_rejects_non_object_params() {
        let args = BindArgs {
            service: "conversation".into(),
            alt_name: None,
            params: "[1]".into(),
        };
        assert!(run_bind(&CredentialResolver::default(), args).is_err());
    }

    #[test]
    fn bind_merges_bundle() {
        let args = BindArgs {
            service: "conversation".into(),
            alt_name: None,
            params: json!({"text": "hello", "__bx_creds": {"conversation": {"username": "u"}}}).to_string(),
        };
        let params = run_bind(&CredentialResolver::default(), args).unwrap();
        assert_eq!(params.into_value(), json!({"text": "hello", "username": "u"}));
    }
}
