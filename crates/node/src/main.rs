use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use pagarex_chainparams::{NetworkParams, ParamsRegistry};
use pagarex_consensus::{bytes_to_hex, hash256_to_hex, Base58Type, Network};
use pagarex_log as logging;
use pagarex_log::{log_debug, log_error, log_info};
use pagarex_pow::difficulty::u256_to_compact;
use serde::Serialize;

const DEFAULT_DATA_DIR: &str = "data";
const CONF_FILE_NAME: &str = "pagarex.conf";

#[derive(Clone, Debug, PartialEq)]
struct Config {
    /// Base data directory, before the profile suffix is applied.
    data_dir: PathBuf,
    conf_path: PathBuf,
    network: Network,
    log_level: logging::Level,
    log_format: logging::Format,
    log_timestamps: bool,
    print_params: bool,
}

#[derive(Debug)]
enum CliAction {
    Run(Config),
    PrintHelp,
    PrintVersion,
}

pub fn run_entry() -> Result<(), String> {
    match parse_args()? {
        CliAction::PrintHelp => {
            println!("{}", usage());
            Ok(())
        }
        CliAction::PrintVersion => {
            println!("pagarexd {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        CliAction::Run(config) => run_with_config(config),
    }
}

fn run_with_config(config: Config) -> Result<(), String> {
    logging::init(logging::LogConfig {
        level: config.log_level,
        format: config.log_format,
        timestamps: config.log_timestamps,
    });

    let registry = pagarex_chainparams::init_params().map_err(|err| {
        log_error!("chain parameter self-check failed: {err}");
        err.to_string()
    })?;
    log_debug!("Startup: config file {}", config.conf_path.display());
    let params = select_network(registry, &config)?;
    let data_dir = network_data_dir(&config.data_dir, &params);
    log_info!("Startup: data dir {}", data_dir.display());

    if config.print_params {
        let summary = ParamsSummary::new(&params, &data_dir);
        let json = serde_json::to_string_pretty(&summary).map_err(|err| err.to_string())?;
        println!("{json}");
    }
    Ok(())
}

/// Applies the configured profile to `registry` and returns the active bundle.
fn select_network(registry: &ParamsRegistry, config: &Config) -> Result<Arc<NetworkParams>, String> {
    registry.select(config.network).map_err(|err| {
        log_error!("{err}");
        err.to_string()
    })?;
    let params = registry.active();
    log_info!(
        "Startup: network={} magic={} p2p_port={} rpc_port={} genesis={}",
        params.network(),
        bytes_to_hex(&params.network_magic()),
        params.default_port(),
        params.rpc_port(),
        hash256_to_hex(&params.genesis_hash())
    );
    Ok(params)
}

fn network_data_dir(base: &Path, params: &NetworkParams) -> PathBuf {
    match params.data_dir_suffix() {
        Some(suffix) => base.join(suffix),
        None => base.to_path_buf(),
    }
}

#[derive(Debug, Serialize)]
struct ParamsSummary {
    network: &'static str,
    magic: String,
    default_port: u16,
    rpc_port: u16,
    pow_limit: String,
    pow_limit_bits: String,
    genesis_hash: String,
    genesis_header_digest: String,
    genesis_merkle_root: String,
    genesis_time: u32,
    genesis_bits: String,
    genesis_nonce: u32,
    last_pow_block: i32,
    base58_prefixes: BTreeMap<&'static str, String>,
    dns_seeds: Vec<DnsSeedSummary>,
    fixed_seeds: Vec<String>,
    data_dir: String,
}

#[derive(Debug, Serialize)]
struct DnsSeedSummary {
    name: &'static str,
    host: &'static str,
}

impl ParamsSummary {
    fn new(params: &NetworkParams, data_dir: &Path) -> Self {
        let header = &params.genesis_block().header;
        Self {
            network: params.network().as_str(),
            magic: bytes_to_hex(&params.network_magic()),
            default_port: params.default_port(),
            rpc_port: params.rpc_port(),
            pow_limit: hash256_to_hex(&params.pow_limit().to_little_endian()),
            pow_limit_bits: format!("{:08x}", u256_to_compact(params.pow_limit())),
            genesis_hash: hash256_to_hex(&params.genesis_hash()),
            genesis_header_digest: hash256_to_hex(&params.genesis_header_digest()),
            genesis_merkle_root: hash256_to_hex(&header.merkle_root),
            genesis_time: header.time,
            genesis_bits: format!("{:08x}", header.bits),
            genesis_nonce: header.nonce,
            last_pow_block: params.last_pow_block(),
            base58_prefixes: Base58Type::ALL
                .iter()
                .map(|kind| (kind.as_str(), bytes_to_hex(params.base58_prefix(*kind))))
                .collect(),
            dns_seeds: params
                .dns_seeds()
                .iter()
                .map(|seed| DnsSeedSummary {
                    name: seed.name,
                    host: seed.host,
                })
                .collect(),
            fixed_seeds: params
                .fixed_seeds()
                .iter()
                .map(|seed| seed.addr.to_string())
                .collect(),
            data_dir: data_dir.display().to_string(),
        }
    }
}

fn parse_args() -> Result<CliAction, String> {
    parse_args_from(std::env::args().skip(1))
}

fn parse_args_from<I>(raw_args: I) -> Result<CliAction, String>
where
    I: IntoIterator<Item = String>,
{
    let mut data_dir: Option<PathBuf> = None;
    let mut conf_path: Option<PathBuf> = None;
    let mut network: Option<Network> = None;
    let mut log_level = logging::Level::Info;
    let mut log_format = logging::Format::Text;
    let mut log_timestamps = true;
    let mut print_params = false;

    let mut args = raw_args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" | "help" => return Ok(CliAction::PrintHelp),
            "--version" | "-V" | "version" => return Ok(CliAction::PrintVersion),
            "--data-dir" | "--datadir" => {
                let value = args
                    .next()
                    .ok_or_else(|| format!("missing value for --data-dir\n{}", usage()))?;
                data_dir = Some(PathBuf::from(value));
            }
            "--conf" => {
                let value = args
                    .next()
                    .ok_or_else(|| format!("missing value for --conf\n{}", usage()))?;
                conf_path = Some(PathBuf::from(value));
            }
            "--testnet" => {
                network = Some(merge_network(network, Network::Testnet)?);
            }
            "--network" => {
                let value = args
                    .next()
                    .ok_or_else(|| format!("missing value for --network\n{}", usage()))?;
                let parsed = Network::parse(&value).ok_or_else(|| {
                    format!("invalid network '{value}' (expected main|test)\n{}", usage())
                })?;
                network = Some(merge_network(network, parsed)?);
            }
            "--log-level" => {
                let value = args
                    .next()
                    .ok_or_else(|| format!("missing value for --log-level\n{}", usage()))?;
                log_level = logging::Level::parse(&value).ok_or_else(|| {
                    format!(
                        "invalid log level '{value}' (expected error|warn|info|debug|trace)\n{}",
                        usage()
                    )
                })?;
            }
            "--log-format" => {
                let value = args
                    .next()
                    .ok_or_else(|| format!("missing value for --log-format\n{}", usage()))?;
                log_format = logging::Format::parse(&value).ok_or_else(|| {
                    format!("invalid log format '{value}' (expected text|json)\n{}", usage())
                })?;
            }
            "--log-timestamps" => log_timestamps = true,
            "--no-log-timestamps" => log_timestamps = false,
            "--print-params" => print_params = true,
            other => return Err(format!("unknown argument '{other}'\n{}", usage())),
        }
    }

    let data_dir = data_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
    let conf_file = conf_path.unwrap_or_else(|| data_dir.join(CONF_FILE_NAME));
    let network = match network {
        Some(network) => network,
        None => network_from_conf(&conf_file)?,
    };

    Ok(CliAction::Run(Config {
        data_dir,
        conf_path: conf_file,
        network,
        log_level,
        log_format,
        log_timestamps,
        print_params,
    }))
}

fn merge_network(current: Option<Network>, requested: Network) -> Result<Network, String> {
    match current {
        Some(existing) if existing != requested => Err(format!(
            "conflicting network options: {existing} and {requested}\n{}",
            usage()
        )),
        _ => Ok(requested),
    }
}

/// Profile chosen by the config file; mainnet when the file or key is absent.
fn network_from_conf(conf_file: &Path) -> Result<Network, String> {
    let Some(conf) = load_conf(conf_file)? else {
        return Ok(Network::Mainnet);
    };
    let Some(raw) = conf.get("testnet").and_then(|values| values.last()) else {
        return Ok(Network::Mainnet);
    };
    match parse_conf_bool(raw) {
        Some(true) => {
            log_debug!("testnet enabled by {}", conf_file.display());
            Ok(Network::Testnet)
        }
        Some(false) => Ok(Network::Mainnet),
        None => Err(format!(
            "invalid testnet value '{raw}' in {}",
            conf_file.display()
        )),
    }
}

fn load_conf(path: &Path) -> Result<Option<HashMap<String, Vec<String>>>, String> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(format!("{}: {err}", path.display())),
    };

    let mut out: HashMap<String, Vec<String>> = HashMap::new();
    for raw_line in contents.lines() {
        let line = raw_line
            .split(['#', ';'])
            .next()
            .unwrap_or_default()
            .trim();
        if line.is_empty() {
            continue;
        }
        // A bare key is a flag.
        let (key, value) = match line.split_once('=') {
            Some((key, value)) => (key.trim(), value.trim()),
            None => (line, "1"),
        };
        if key.is_empty() {
            continue;
        }
        out.entry(key.to_ascii_lowercase())
            .or_default()
            .push(value.to_string());
    }
    Ok(Some(out))
}

fn parse_conf_bool(value: &str) -> Option<bool> {
    let value = value.trim();
    if value.is_empty() {
        return Some(true);
    }
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

fn usage() -> String {
    [
        "Usage:",
        "  pagarexd [options]",
        "",
        "Options:",
        "  --help, -h  Print this help and exit",
        "  --version, -V  Print version and exit",
        "  --testnet  Use the test network (same as --network test)",
        "  --network  Network profile (main|test) (default: main)",
        "  --data-dir  Base data directory (default: ./data)",
        "  --conf  Config file path (default: <data-dir>/pagarex.conf)",
        "  --log-level  Log verbosity (error|warn|info|debug|trace) (default: info)",
        "  --log-format  Log output format (text|json) (default: text)",
        "  --log-timestamps  Enable timestamps in text logs (default: on)",
        "  --no-log-timestamps  Disable timestamps in text logs",
        "  --print-params  Print the active chain parameters as JSON",
        "",
        "Config file:",
        "  key=value lines, '#' or ';' start a comment",
        "  testnet=1  Use the test network unless --testnet/--network is given",
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    struct TempDirGuard {
        path: PathBuf,
    }

    impl TempDirGuard {
        fn new(prefix: &str) -> Self {
            let nanos = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos();
            let path =
                std::env::temp_dir().join(format!("{prefix}-{}-{nanos}", std::process::id()));
            fs::create_dir_all(&path).expect("create temp dir");
            Self { path }
        }

        fn write_conf(&self, contents: &str) {
            fs::write(self.path.join(CONF_FILE_NAME), contents).expect("write conf");
        }
    }

    impl Drop for TempDirGuard {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.path);
        }
    }

    fn args(dir: &TempDirGuard, extra: &[&str]) -> Vec<String> {
        let mut out = vec![
            "--data-dir".to_string(),
            dir.path.display().to_string(),
        ];
        out.extend(extra.iter().map(|arg| arg.to_string()));
        out
    }

    fn run_config(raw: Vec<String>) -> Config {
        match parse_args_from(raw).expect("parse args") {
            CliAction::Run(config) => config,
            other => panic!("expected run action, got {other:?}"),
        }
    }

    #[test]
    fn defaults_to_mainnet() {
        let dir = TempDirGuard::new("pagarexd-defaults");
        let config = run_config(args(&dir, &[]));
        assert_eq!(config.network, Network::Mainnet);
        assert_eq!(config.conf_path, dir.path.join(CONF_FILE_NAME));
        assert_eq!(config.log_level, logging::Level::Info);
        assert!(config.log_timestamps);
        assert!(!config.print_params);
    }

    #[test]
    fn testnet_flag_and_network_option() {
        let dir = TempDirGuard::new("pagarexd-flags");
        assert_eq!(
            run_config(args(&dir, &["--testnet"])).network,
            Network::Testnet
        );
        assert_eq!(
            run_config(args(&dir, &["--network", "test"])).network,
            Network::Testnet
        );
        assert_eq!(
            run_config(args(&dir, &["--network", "mainnet"])).network,
            Network::Mainnet
        );
        assert_eq!(
            run_config(args(&dir, &["--testnet", "--network", "testnet"])).network,
            Network::Testnet
        );
    }

    #[test]
    fn rejects_bad_arguments() {
        let dir = TempDirGuard::new("pagarexd-bad-args");
        let err = parse_args_from(args(&dir, &["--network", "regtest"])).unwrap_err();
        assert!(err.starts_with("invalid network 'regtest'"));
        let err = parse_args_from(args(&dir, &["--testnet", "--network", "main"])).unwrap_err();
        assert!(err.starts_with("conflicting network options"));
        let err = parse_args_from(vec!["--conf".to_string()]).unwrap_err();
        assert!(err.starts_with("missing value for --conf"));
        let err = parse_args_from(args(&dir, &["--log-level", "loud"])).unwrap_err();
        assert!(err.starts_with("invalid log level"));
        let err = parse_args_from(args(&dir, &["--bogus"])).unwrap_err();
        assert!(err.starts_with("unknown argument '--bogus'"));
    }

    #[test]
    fn help_and_version_short_circuit() {
        assert!(matches!(
            parse_args_from(vec!["--help".to_string(), "--bogus".to_string()]),
            Ok(CliAction::PrintHelp)
        ));
        assert!(matches!(
            parse_args_from(vec!["-V".to_string()]),
            Ok(CliAction::PrintVersion)
        ));
    }

    #[test]
    fn conf_file_selects_testnet() {
        let dir = TempDirGuard::new("pagarexd-conf");
        dir.write_conf("# node settings\nrpcuser=alice ; trailing comment\ntestnet=1\n");
        assert_eq!(run_config(args(&dir, &[])).network, Network::Testnet);

        dir.write_conf("testnet\n");
        assert_eq!(run_config(args(&dir, &[])).network, Network::Testnet);

        dir.write_conf("testnet=1\ntestnet=0\n");
        assert_eq!(run_config(args(&dir, &[])).network, Network::Mainnet);
    }

    #[test]
    fn command_line_wins_over_conf() {
        let dir = TempDirGuard::new("pagarexd-conf-override");
        dir.write_conf("testnet=1\n");
        let config = run_config(args(&dir, &["--network", "main"]));
        assert_eq!(config.network, Network::Mainnet);
    }

    #[test]
    fn explicit_conf_path_and_bad_value() {
        let dir = TempDirGuard::new("pagarexd-conf-path");
        let conf = dir.path.join("other.conf");
        fs::write(&conf, "testnet=maybe\n").expect("write conf");
        let err = parse_args_from(args(&dir, &["--conf", &conf.display().to_string()]))
            .unwrap_err();
        assert!(err.starts_with("invalid testnet value 'maybe'"));
    }

    #[test]
    fn conf_parser_handles_comments_and_case() {
        let dir = TempDirGuard::new("pagarexd-conf-parse");
        dir.write_conf("; header\n\n  TestNet = yes # inline\n=orphan\nlisten\n");
        let conf = load_conf(&dir.path.join(CONF_FILE_NAME))
            .expect("read conf")
            .expect("conf exists");
        assert_eq!(conf.get("testnet"), Some(&vec!["yes".to_string()]));
        assert_eq!(conf.get("listen"), Some(&vec!["1".to_string()]));
        assert_eq!(conf.len(), 2);
        assert_eq!(load_conf(&dir.path.join("missing.conf")), Ok(None));
    }

    #[test]
    fn conf_bool_values() {
        assert_eq!(parse_conf_bool(""), Some(true));
        assert_eq!(parse_conf_bool("TRUE"), Some(true));
        assert_eq!(parse_conf_bool("0"), Some(false));
        assert_eq!(parse_conf_bool("2"), None);
    }

    #[test]
    fn startup_selects_mainnet_by_default() {
        let dir = TempDirGuard::new("pagarexd-start-main");
        let registry = ParamsRegistry::new().expect("registry");
        let config = run_config(args(&dir, &[]));
        let params = select_network(&registry, &config).expect("select");
        assert_eq!(params.network(), Network::Mainnet);
        assert_eq!(params.default_port(), 44_250);
        assert_eq!(params.fixed_seeds().len(), 3);
        assert_eq!(network_data_dir(&config.data_dir, &params), dir.path);
    }

    #[test]
    fn startup_with_testnet_flag() {
        let dir = TempDirGuard::new("pagarexd-start-test");
        let registry = ParamsRegistry::new().expect("registry");
        let config = run_config(args(&dir, &["--testnet"]));
        let params = select_network(&registry, &config).expect("select");
        assert_eq!(params.network(), Network::Testnet);
        assert_eq!(params.default_port(), 44_251);
        assert!(params.fixed_seeds().is_empty());
        assert_eq!(params.last_pow_block(), i32::MAX);
        assert_eq!(
            network_data_dir(&config.data_dir, &params),
            dir.path.join("testnet")
        );
    }

    #[test]
    fn startup_refuses_switch_after_use() {
        let dir = TempDirGuard::new("pagarexd-start-sealed");
        let registry = ParamsRegistry::new().expect("registry");
        let _ = registry.active();
        let config = run_config(args(&dir, &["--testnet"]));

        logging::set_stderr_enabled(false);
        logging::enable_capture(256);
        let err = select_network(&registry, &config).unwrap_err();
        let logs = logging::capture_snapshot(256);
        logging::set_stderr_enabled(true);

        assert!(err.contains("already in use"));
        assert!(logs.iter().any(|line| {
            line.level == logging::Level::Error
                && line.msg == "cannot select test parameters: main parameters are already in use"
        }));
    }

    #[test]
    fn summary_json_describes_active_params() {
        let registry = ParamsRegistry::new().expect("registry");
        let params = registry.get(Network::Testnet);
        let summary = ParamsSummary::new(&params, Path::new("data/testnet"));
        let value = serde_json::to_value(&summary).expect("json");
        assert_eq!(value["network"], "test");
        assert_eq!(value["magic"], "e4c4fe24");
        assert_eq!(value["default_port"], 44_251);
        assert_eq!(value["pow_limit_bits"], "1f00ffff");
        assert_eq!(value["genesis_bits"], "1e0fffff");
        assert_eq!(
            value["genesis_hash"],
            "00000c7a44c2684992e1988b3fced0fcd2f121eef8730859770b296a94a8064c"
        );
        assert_eq!(
            value["genesis_header_digest"],
            "e1cdb352995a1c9cfb66308f2b2a0097c2793f276d54d8c29dde942a528c439f"
        );
        assert_eq!(value["base58_prefixes"]["pubkey_address"], "75");
        assert_eq!(value["base58_prefixes"]["ext_secret_key"], "04358394");
        assert_eq!(value["fixed_seeds"].as_array().map(Vec::len), Some(0));
        assert_eq!(
            value["pow_limit"],
            "0000ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff"
        );
    }

    #[test]
    fn usage_lists_network_options() {
        let text = usage();
        assert!(text.contains("--testnet"));
        assert!(text.contains("--network"));
        assert!(text.contains("testnet=1"));
    }
}
