//! Corpus data model and the built-in service corpus.

use serde::{Deserialize, Serialize};
use shuttlechat_core::context::Destination;
use shuttlechat_core::error::KnowledgeError;
use shuttlechat_core::knowledge::Location;
use std::path::Path;

/// Topic id whose entry carries flight-timing guidance.
pub const FLIGHT_TIMING_TOPIC: &str = "flight_timing";

/// A complete knowledge corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeCorpus {
    pub topics: Vec<TopicEntry>,

    /// Checked in declaration order; the first matching region wins.
    pub regions: Vec<RegionEntry>,

    #[serde(default)]
    pub locations: Vec<Location>,
}

/// Facts about one service topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicEntry {
    pub id: String,

    /// Lowercase keywords, matched on word boundaries
    pub keywords: Vec<String>,

    pub facts: serde_json::Value,
}

/// Flight guidance for one destination region.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionEntry {
    pub destination: Destination,

    /// Lowercase country and city names, matched on word boundaries
    pub aliases: Vec<String>,

    /// Minutes between hotel pickup and flight departure
    pub lead_minutes: u32,

    pub note: String,
}

impl KnowledgeCorpus {
    /// Load a corpus from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, KnowledgeError> {
        let content = std::fs::read_to_string(path).map_err(|e| KnowledgeError::CorpusLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| KnowledgeError::CorpusLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    pub fn topic(&self, id: &str) -> Option<&TopicEntry> {
        self.topics.iter().find(|t| t.id == id)
    }

    pub fn region(&self, destination: Destination) -> Option<&RegionEntry> {
        self.regions.iter().find(|r| r.destination == destination)
    }

    /// The built-in airport-shuttle corpus.
    pub fn builtin() -> Self {
        Self {
            topics: builtin_topics(),
            regions: builtin_regions(),
            locations: builtin_locations(),
        }
    }
}

impl Default for KnowledgeCorpus {
    fn default() -> Self {
        Self::builtin()
    }
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn builtin_topics() -> Vec<TopicEntry> {
    vec![
        TopicEntry {
            id: FLIGHT_TIMING_TOPIC.into(),
            keywords: words(&["flight", "flights", "departure", "depart", "departing", "check-in", "check in", "airport", "kef"]),
            facts: serde_json::json!({
                "summary": "The airport transfer to Keflavík International Airport (KEF) takes about 45 minutes from the city terminal.",
                "schedule": "Airport buses leave the city terminal in time for every scheduled departure, starting at 03:30.",
                "hotelPickup": "Hotel pickup starts 30 minutes before the bus leaves the terminal.",
            }),
        },
        TopicEntry {
            id: "booking".into(),
            keywords: words(&["book", "booking", "ticket", "tickets", "reservation", "reserve", "price", "prices", "cost"]),
            facts: serde_json::json!({
                "howToBook": "Tickets can be booked online, at the hotel reception, or at the city terminal.",
                "prices": {"oneWay": "3,999 ISK", "return": "6,999 ISK", "hotelPickupSupplement": "1,000 ISK"},
                "children": "Children aged 0-5 travel free; ages 6-15 pay half price.",
            }),
        },
        TopicEntry {
            id: "pickup".into(),
            keywords: words(&["pickup", "pick up", "pick-up", "collect", "collected", "hotel", "bus stop"]),
            facts: serde_json::json!({
                "window": "Be ready at your pickup point from the start of the pickup window; pickups can take up to 30 minutes.",
                "missedPickup": "If the bus has not arrived 30 minutes after the pickup time, call the service desk.",
                "restrictedZone": "Buses cannot enter the city-centre restricted zone; those hotels are served from the nearest numbered bus stop.",
            }),
        },
        TopicEntry {
            id: "luggage".into(),
            keywords: words(&["luggage", "bag", "bags", "suitcase", "suitcases", "baggage", "ski", "skis", "bike"]),
            facts: serde_json::json!({
                "allowance": "Two suitcases and one piece of hand luggage per passenger are included.",
                "oversized": "Skis, golf bags and bicycles travel for a 2,000 ISK supplement and must be declared when booking.",
            }),
        },
        TopicEntry {
            id: "payment".into(),
            keywords: words(&["pay", "payment", "card", "cash", "credit card", "receipt", "invoice"]),
            facts: serde_json::json!({
                "methods": "Card payments are accepted online and on board; cash is not accepted on the bus.",
                "receipts": "A receipt is emailed automatically after an online booking.",
            }),
        },
        TopicEntry {
            id: "cancellation".into(),
            keywords: words(&["cancel", "cancellation", "refund", "reschedule", "change booking"]),
            facts: serde_json::json!({
                "policy": "Free cancellation up to 24 hours before departure; later cancellations are not refunded.",
                "changes": "Date and time changes are free of charge when made at least 2 hours before the booked departure.",
            }),
        },
    ]
}

fn builtin_regions() -> Vec<RegionEntry> {
    vec![
        RegionEntry {
            destination: Destination::Europe,
            aliases: words(&[
                "europe", "spain", "uk", "united kingdom", "france", "germany", "italy", "netherlands",
                "denmark", "norway", "sweden", "ireland", "london", "paris", "berlin", "amsterdam",
                "copenhagen", "oslo", "stockholm", "dublin", "barcelona", "madrid", "manchester",
            ]),
            lead_minutes: 210,
            note: "For flights to Europe, be at the airport 2.5 hours before departure.".into(),
        },
        RegionEntry {
            destination: Destination::UsCanada,
            aliases: words(&[
                "usa", "u.s", "united states", "america", "canada", "new york", "toronto", "boston",
                "seattle", "chicago", "denver", "washington", "montreal", "vancouver", "minneapolis",
            ]),
            lead_minutes: 240,
            note: "For flights to the US or Canada, be at the airport 3 hours before departure.".into(),
        },
    ]
}

fn builtin_locations() -> Vec<Location> {
    let loc = |name: &str, aliases: &[&str], pickup_point: &str, stop_number: Option<u32>| Location {
        name: name.into(),
        aliases: words(aliases),
        pickup_point: pickup_point.into(),
        stop_number,
        notes: None,
    };

    vec![
        loc("Hotel Borg", &["borg"], "Bus stop 2 - Ráðhúsið", Some(2)),
        loc("Hilton Reykjavik Nordica", &["hilton", "nordica"], "Hotel entrance", None),
        loc("Grand Hotel Reykjavik", &["grand hotel"], "Hotel entrance", None),
        loc("Fosshotel Baron", &["baron"], "Bus stop 11 - Snorrabraut", Some(11)),
        loc("Hallgrímskirkja", &["hallgrimskirkja", "church"], "Bus stop 8 - Hallgrímskirkja", Some(8)),
        Location {
            notes: Some("All airport buses depart from the city terminal.".into()),
            ..loc("BSÍ Bus Terminal", &["bsi", "bsí", "city terminal", "bus terminal"], "Terminal building", None)
        },
    ]
}
