//! Curated word lists used by the classifier, the strategies, and the scorer.
//!
//! All entries are lower-case. Multi-word entries are matched as whole
//! phrases against a [`word_string`](execscout_shared::text::word_string).
//! Words that double as common surnames (Baker, Day, Green, Lane, Power,
//! West, ...) are deliberately absent.

/// Service categories, legal suffixes, web/navigation words, and trade
/// jargon. A name token found here is strong evidence of a business phrase.
pub const BUSINESS_TERMS: &[&str] = &[
    // service categories
    "service", "services", "servicing", "emergency", "repair", "repairs", "installation",
    "installations", "install", "maintenance", "heating", "plumbing", "plumber", "plumbers",
    "gas", "safe", "safety", "boiler", "boilers", "central", "underfloor", "bathroom",
    "bathrooms", "kitchen", "kitchens", "fitting", "fittings", "fitter", "fitters",
    "electrical", "electrician", "electricians", "electric", "flushing", "powerflush",
    "leak", "leaks", "detection", "drainage", "drain", "drains", "landlord", "landlords",
    "certificate", "certificates", "inspection", "inspections", "testing", "roofing",
    "glazing", "plastering", "tiling", "decorating", "carpentry", "joinery", "landscaping",
    "cleaning", "gutter", "guttering", "refurbishment", "renovation", "renovations",
    "extension", "extensions", "construction", "building", "builders", "rewiring",
    "callout", "unvented", "combi", "cylinder", "radiators", "thermostats", "ventilation",
    "conditioning", "solar", "renewable", "renewables", "heat", "pump", "pumps", "energy",
    // legal suffixes and company words
    "ltd", "limited", "llp", "plc", "inc", "llc", "co", "company", "group", "holdings",
    "corporation", "corp", "enterprises", "associates", "solutions", "trading", "business",
    "firm", "agency", "contractors", "contractor",
    // generic web and navigation words
    "home", "about", "contact", "us", "our", "team", "gallery", "blog", "news", "privacy",
    "policy", "terms", "conditions", "cookie", "cookies", "login", "menu", "read", "more",
    "click", "here", "view", "call", "now", "get", "quote", "quotes", "free", "book",
    "online", "request", "callback", "enquiry", "enquiries", "welcome", "testimonials",
    "reviews", "faq", "faqs", "sitemap", "follow", "share", "email", "phone", "tel",
    "mobile", "address", "opening", "hours", "areas", "covered", "copyright", "rights",
    "reserved", "website", "powered", "why", "choose", "meet", "find", "learn", "submit",
    // trade jargon
    "accredited", "approved", "registered", "certified", "insured", "guarantee",
    "guaranteed", "warranty", "quality", "professional", "reliable", "local", "affordable",
    "competitive", "prices", "rates", "estimate", "estimates", "survey", "commercial",
    "domestic", "residential", "industrial", "customer", "customers", "satisfaction",
    "award", "winning", "experts", "expert", "specialist", "specialists", "engineer",
    "engineers", "system", "systems", "efficient", "hot", "water", "pressure", "fully",
];

/// Multi-word service phrases; a name equal to one of these takes an extra
/// penalty on top of the per-token one.
pub const BUSINESS_PHRASES: &[&str] = &[
    "emergency service", "emergency services", "gas safe", "gas safety", "boiler installation",
    "boiler repair", "boiler repairs", "boiler service", "boiler servicing", "central heating",
    "underfloor heating", "power flushing", "leak detection", "bathroom fitting",
    "kitchen fitting", "landlord certificates", "landlord certificate", "free quote",
    "free quotes", "contact us", "about us", "read more", "get a quote", "privacy policy",
    "heat pump", "heat pumps", "hot water", "air conditioning", "customer service",
];

/// Place names and address words. Strategies drop any match containing one.
pub const LOCATION_TERMS: &[&str] = &[
    "street", "road", "avenue", "crescent", "boulevard", "london", "birmingham",
    "manchester", "leeds", "liverpool", "bristol", "sheffield", "glasgow", "edinburgh",
    "cardiff", "belfast", "nottingham", "leicester", "coventry", "bradford", "wolverhampton",
    "solihull", "harrow", "midlands", "yorkshire", "lancashire",
    "essex", "surrey", "sussex", "cheshire", "merseyside", "england", "scotland",
    "wales", "uk", "britain", "county", "city", "town", "village", "postcode",
];

/// Generic objects and page furniture. Strategies drop any match containing one.
pub const OBJECT_TERMS: &[&str] = &[
    "radiator", "shower", "showers", "tap", "taps", "pipe", "pipes", "tank", "tanks",
    "thermostat", "valve", "valves", "toilet", "toilets", "sink", "sinks", "window",
    "windows", "door", "doors", "roof", "floor", "floors", "button", "map", "cart",
    "basket", "form", "image", "photo", "video", "logo", "icon", "slider",
];

/// Executive and staff role phrases, used for context bonuses and title guesses.
pub const ROLE_TERMS: &[&str] = &[
    "managing director", "director", "owner", "co owner", "founder", "co founder",
    "manager", "general manager", "operations manager", "office manager", "ceo", "cfo",
    "coo", "cto", "md", "chief executive", "chief executive officer", "chairman",
    "chairwoman", "president", "principal", "proprietor", "partner", "head of operations",
    "company secretary",
];

/// Titles that carry ownership or senior leadership authority.
pub const DECISION_MAKER_TERMS: &[&str] = &[
    "owner", "co owner", "director", "managing director", "founder", "co founder", "ceo",
    "md", "chief executive", "chief executive officer", "principal", "proprietor",
    "chairman", "chairwoman", "president",
];

/// Phrases that read like a biography.
pub const BIOGRAPHICAL_MARKERS: &[&str] = &[
    "founded", "joined", "graduated", "qualified", "qualifying", "trained", "established",
    "started", "career", "apprenticeship", "years of experience", "years experience",
    "years in the trade", "studied",
];

/// Honorific prefixes, without trailing dots.
pub const HONORIFICS: &[&str] = &["mr", "mrs", "ms", "miss", "mx", "dr", "prof", "sir", "dame"];

/// Words that introduce a name in running text and should not be part of it.
pub const LEAD_IN_WORDS: &[&str] = &[
    "meet", "contact", "call", "email", "speak", "ask", "about", "our", "the", "dear", "hi",
    "hello", "regards", "thanks", "by", "with", "from", "owner", "director", "founder",
    "manager",
];

fn lookup(list: &[&str], word: &str) -> bool {
    list.contains(&word)
}

/// Lower-cases and strips surrounding punctuation.
pub fn normalize_token(token: &str) -> String {
    token
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase()
}

pub fn is_business_term(token: &str) -> bool {
    let t = normalize_token(token);
    !t.is_empty() && lookup(BUSINESS_TERMS, &t)
}

pub fn is_business_phrase(name: &str) -> bool {
    let phrase = name
        .split_whitespace()
        .map(normalize_token)
        .collect::<Vec<_>>()
        .join(" ");
    lookup(BUSINESS_PHRASES, &phrase)
}

pub fn is_location_term(token: &str) -> bool {
    lookup(LOCATION_TERMS, &normalize_token(token))
}

pub fn is_object_term(token: &str) -> bool {
    lookup(OBJECT_TERMS, &normalize_token(token))
}

pub fn is_honorific(token: &str) -> bool {
    lookup(HONORIFICS, &normalize_token(token))
}

pub fn is_lead_in(token: &str) -> bool {
    lookup(LEAD_IN_WORDS, &normalize_token(token))
}

/// Whether a title names an owner or senior leader.
pub fn is_decision_maker_title(title: &str) -> bool {
    let words = execscout_shared::text::word_string(title);
    DECISION_MAKER_TERMS
        .iter()
        .any(|term| execscout_shared::text::contains_term(&words, term))
}
