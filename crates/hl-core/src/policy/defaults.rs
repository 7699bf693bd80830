//! Built-in default lists
//!
//! Used when storage holds no value (or a value that is not a list).

/// Sites where transformation is permitted out of the box
pub const DEFAULT_ALLOWLIST: &[&str] = &[
    "ycombinator.com",
    "news.ycombinator.com",
    "reddit.com",
    "substack.com",
    "medium.com",
    "techcrunch.com",
    "economist.com",
];

/// Sensitive sites (banking) that are never transformed out of the box
pub const DEFAULT_BLOCKLIST: &[&str] = &[
    "chase.com",
    "bankofamerica.com",
    "wellsfargo.com",
    "citi.com",
    "usbank.com",
    "capitalone.com",
    "discover.com",
    "americanexpress.com",
    "schwab.com",
    "fidelity.com",
    "vanguard.com",
    // UK banks and banks operating in the UK
    "barclays.co.uk",
    "barclaycard.co.uk",
    "hsbc.co.uk",
    "firstdirect.com",
    "lloydsbank.com",
    "halifax.co.uk",
    "bankofscotland.co.uk",
    "natwest.com",
    "rbs.co.uk",
    "ulsterbank.co.uk",
    "santander.co.uk",
    "tsb.co.uk",
    "nationwide.co.uk",
    "metrobankonline.co.uk",
    "co-operativebank.co.uk",
    "virginmoney.com",
    "clydesdalebank.co.uk",
    "yorkshirebank.co.uk",
    "starlingbank.com",
    "monzo.com",
    "revolut.com",
    "chase.co.uk",
    "zopa.com",
    "atombank.co.uk",
    "tandem.co.uk",
    "aldermore.co.uk",
    "paragonbank.co.uk",
    "shawbrook.co.uk",
    "triodos.co.uk",
    "caterallen.co.uk",
    "sainsburysbank.co.uk",
    "tescobank.com",
    "marksandspencer.com",
    "bankofirelanduk.com",
    "aibgb.co.uk",
    "icicibank.co.uk",
    "citibank.co.uk",
    "sc.co.uk",
];

/// Default allowlist as owned strings
pub fn default_allowlist() -> Vec<String> {
    DEFAULT_ALLOWLIST.iter().map(|s| s.to_string()).collect()
}

/// Default blocklist as owned strings
pub fn default_blocklist() -> Vec<String> {
    DEFAULT_BLOCKLIST.iter().map(|s| s.to_string()).collect()
}
