//! Record classification.
//!
//! A pure decision table over the enrichment sentinels; no network or
//! I/O. Downstream consumers key on these flags, so the derivation must
//! stay consistent with the sentinel fields it is computed from.

use nycdomains_core::{Field, WebsiteStatus};

/// The derived reachability flags for one enriched record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// Whether the final address holds a real value.
    pub is_address_found: bool,
    /// Whether the title holds a real value.
    pub is_title_found: bool,
    /// Overall reachability classification.
    pub website_status: WebsiteStatus,
}

/// Classify a record from its final address and title.
///
/// A value counts as found iff it is non-empty and neither sentinel.
/// Both found is `IsComplete`; address only is `IsLive`; no address is
/// `IsDown` regardless of the title.
#[must_use]
pub fn classify(final_address: &Field<String>, title: &Field<String>) -> Classification {
    let is_address_found = final_address.is_found();
    let is_title_found = title.is_found();

    let website_status = if is_address_found && is_title_found {
        WebsiteStatus::IsComplete
    } else if is_address_found {
        WebsiteStatus::IsLive
    } else {
        WebsiteStatus::IsDown
    };

    Classification {
        is_address_found,
        is_title_found,
        website_status,
    }
}
