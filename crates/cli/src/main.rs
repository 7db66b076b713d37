use anyhow::{Context, Result};
use clap::Parser;

use jobscope_core::{Job, JobFinder, QueueBackend};
use jobscope_infra::{ConfigError, RedisConfig};
use jobscope_observability::LogFormat;

mod demo;

/// Find Resque jobs whose class name contains TERM, whether working,
/// delayed or queued. Prints the matches as JSON.
#[derive(Parser, Debug)]
#[clap(name = "jobscope", version)]
struct CliArgs {
    /// Case-insensitive fragment of a job class name. Empty matches nothing.
    pub term: Option<String>,

    /// Redis URL (defaults to $REDIS_URL, then redis://localhost:6379).
    #[clap(long)]
    pub redis_url: Option<String>,

    /// Resque key namespace (defaults to $RESQUE_NAMESPACE, then "resque").
    #[clap(long)]
    pub namespace: Option<String>,

    /// Search built-in sample data instead of Redis.
    #[clap(long)]
    pub demo: bool,

    /// Pretty-print the JSON output.
    #[clap(long)]
    pub pretty: bool,

    /// Human-readable log lines instead of JSON.
    #[clap(long)]
    pub text_logs: bool,
}

fn find(backend: &dyn QueueBackend, term: Option<&str>) -> Result<Vec<Job>> {
    let jobs = JobFinder::new(backend, term)
        .find_jobs()
        .context("job search failed")?;
    tracing::info!(matches = jobs.len(), "search finished");
    Ok(jobs)
}

/// Flags win over the environment; validation runs on the merged result.
fn resolve_config(base: RedisConfig, args: &CliArgs) -> Result<RedisConfig, ConfigError> {
    let mut config = base;
    if let Some(url) = &args.redis_url {
        config = config.with_url(url.clone());
    }
    if let Some(namespace) = &args.namespace {
        config = config.with_namespace(namespace.clone());
    }
    config.validated()
}

#[cfg(feature = "redis")]
fn find_in_redis(args: &CliArgs) -> Result<Vec<Job>> {
    use jobscope_infra::RedisQueueBackend;

    let config = resolve_config(RedisConfig::from_env(), args)?;

    tracing::debug!(namespace = %config.namespace, "searching redis");
    let backend = RedisQueueBackend::new(&config)
        .with_context(|| format!("could not open redis client for {}", config.url))?;
    find(&backend, args.term.as_deref())
}

#[cfg(not(feature = "redis"))]
fn find_in_redis(_args: &CliArgs) -> Result<Vec<Job>> {
    anyhow::bail!("built without redis support; use --demo")
}

fn main() -> Result<()> {
    let args = CliArgs::parse();
    let format = if args.text_logs { LogFormat::Text } else { LogFormat::Json };
    jobscope_observability::init(format);

    let jobs = if args.demo {
        find(&demo::backend(), args.term.as_deref())?
    } else {
        find_in_redis(&args)?
    };

    let output = if args.pretty {
        serde_json::to_string_pretty(&jobs)?
    } else {
        serde_json::to_string(&jobs)?
    };
    println!("{output}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_search_spans_all_collections() {
        let jobs = find(&demo::backend(), Some("email")).unwrap();

        let where_at: Vec<_> = jobs.iter().filter_map(Job::where_at).collect();
        assert_eq!(where_at, ["working", "delayed", "queued"]);
    }

    #[test]
    fn empty_term_prints_nothing() {
        assert!(find(&demo::backend(), None).unwrap().is_empty());
    }

    #[test]
    fn namespace_flag_overrides_a_bad_environment_value() {
        let base = RedisConfig::default().with_namespace(":");
        let args = CliArgs::parse_from(["jobscope", "Email", "--namespace", "app"]);

        let config = resolve_config(base.clone(), &args).unwrap();
        assert_eq!(config.namespace, "app");

        let args = CliArgs::parse_from(["jobscope", "Email"]);
        assert!(resolve_config(base, &args).is_err());
    }

    #[test]
    fn parses_flags() {
        let args = CliArgs::parse_from(["jobscope", "Email", "--demo", "--namespace", "app"]);
        assert_eq!(args.term.as_deref(), Some("Email"));
        assert!(args.demo);
        assert_eq!(args.namespace.as_deref(), Some("app"));
    }
}
