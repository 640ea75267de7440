//! Encodes and decodes the memo cases of a TOML file and reports throughput.
//!
//! Usage: `memo_bench [cases.toml]`. Set `RUST_LOG=debug` to see rejected memos.

use std::fs;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use memo_codec::{
    hex_to_address, strip_hex_prefix, EncodingFormat, FieldsV0, Header, InboundMemo, OpCode,
    RevertOptions,
};
use serde::Deserialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_CASES: &str = "cases.toml";

#[derive(Debug, Deserialize)]
struct BenchConfig {
    iterations: u64,
    #[serde(rename = "case")]
    cases: Vec<MemoCase>,
}

#[derive(Debug, Deserialize)]
struct MemoCase {
    name: String,
    encoding: String,
    op_code: String,
    receiver: String,
    #[serde(default)]
    payload: Option<String>,
    #[serde(default)]
    revert_address: String,
    #[serde(default)]
    call_on_revert: bool,
    #[serde(default)]
    abort_address: String,
    #[serde(default)]
    revert_message: Option<String>,
}

impl MemoCase {
    fn to_memo(&self) -> Result<InboundMemo> {
        let encoding_fmt = match self.encoding.as_str() {
            "abi" => EncodingFormat::ABI,
            "compact_short" => EncodingFormat::COMPACT_SHORT,
            "compact_long" => EncodingFormat::COMPACT_LONG,
            other => bail!("unknown encoding {other:?}"),
        };
        let op_code = match self.op_code.as_str() {
            "deposit" => OpCode::DEPOSIT,
            "deposit_and_call" => OpCode::DEPOSIT_AND_CALL,
            "call" => OpCode::CALL,
            other => bail!("unknown op code {other:?}"),
        };

        Ok(InboundMemo {
            header: Header { encoding_fmt, op_code, ..Default::default() },
            fields_v0: FieldsV0 {
                receiver: hex_to_address(&self.receiver)?,
                payload: decode_hex(self.payload.as_deref())?,
                revert_options: RevertOptions {
                    revert_address: self.revert_address.clone(),
                    call_on_revert: self.call_on_revert,
                    abort_address: self.abort_address.clone(),
                    revert_message: decode_hex(self.revert_message.as_deref())?,
                },
            },
        })
    }
}

fn decode_hex(text: Option<&str>) -> Result<Vec<u8>> {
    match text {
        None => Ok(Vec::new()),
        Some(text) => {
            hex::decode(strip_hex_prefix(text)).with_context(|| format!("invalid hex {text:?}"))
        }
    }
}

fn run_case(case: &MemoCase, iterations: u64) -> Result<(usize, Duration, Duration)> {
    let mut memo = case.to_memo().with_context(|| format!("case {:?}", case.name))?;

    let start = Instant::now();
    let mut data = Vec::new();
    for _ in 0..iterations {
        data = memo.encode_to_bytes()?;
    }
    let encode = start.elapsed();

    let start = Instant::now();
    for _ in 0..iterations {
        let decoded = InboundMemo::decode_from_bytes(&data)?;
        if decoded != memo {
            bail!("case {:?} does not round-trip", case.name);
        }
    }
    let decode = start.elapsed();

    Ok((data.len(), encode, decode))
}

fn per_second(iterations: u64, elapsed: Duration) -> f64 {
    iterations as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CASES.to_string());
    let text = fs::read_to_string(&path).with_context(|| format!("failed to read {path}"))?;
    let config: BenchConfig = toml::from_str(&text).with_context(|| format!("failed to parse {path}"))?;

    info!(cases = config.cases.len(), iterations = config.iterations, "loaded memo cases");

    let mut failed = 0;
    for case in &config.cases {
        match run_case(case, config.iterations) {
            Ok((len, encode, decode)) => info!(
                case = %case.name,
                bytes = len,
                encode_per_sec = per_second(config.iterations, encode) as u64,
                decode_per_sec = per_second(config.iterations, decode) as u64,
                "benchmarked"
            ),
            Err(e) => {
                failed += 1;
                warn!(case = %case.name, error = %format!("{e:#}"), "case failed");
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {} cases failed", config.cases.len());
    }
    Ok(())
}
