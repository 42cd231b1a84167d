pub const DEFAULT_TICKERS: [&str; 3] = ["AAPL", "MSFT", "TSLA"];

/// Picks the ticker list: CLI arguments first, then the comma-separated `TICKERS` value, then the
/// built-in defaults. Symbols are trimmed and upper-cased; blanks and repeats are dropped.
pub fn resolve_tickers(args: &[String], env_list: Option<&str>) -> Vec<String> {
    let raw: Vec<String> = if !args.is_empty() {
        args.iter()
            .flat_map(|a| a.split(','))
            .map(str::to_string)
            .collect()
    } else if let Some(list) = env_list.filter(|s| !s.trim().is_empty()) {
        list.split(',').map(str::to_string).collect()
    } else {
        DEFAULT_TICKERS.iter().map(|s| s.to_string()).collect()
    };

    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for t in raw {
        let t = t.trim().to_ascii_uppercase();
        if t.is_empty() || out.contains(&t) {
            continue;
        }
        out.push(t);
    }
    out
}
