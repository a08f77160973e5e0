#[cfg(test)]
mod tests {
    use crate::models::{CollectionOpportunity, FilterState, MatchStatus};
    use crate::services::diagnostics::{FilterFault, RecordingDiagnostics};
    use crate::services::filtering::{
        filter_opportunities, filter_opportunities_with, matches_search, opportunity_matches,
    };

    fn create_test_opportunity(id: &str, status: Option<MatchStatus>) -> CollectionOpportunity {
        let mut opp = CollectionOpportunity::new(id, format!("Pass {}", id))
            .with_satellite(format!("SAT-{}", id), Some("Sentinel-2A"))
            .with_sites(["GS-SVALBARD"]);
        opp.match_status = status;
        opp
    }

    fn mixed_deck() -> Vec<CollectionOpportunity> {
        vec![
            create_test_opportunity("1", None),
            create_test_opportunity("2", Some(MatchStatus::Unmatched)),
            create_test_opportunity("3", Some(MatchStatus::Baseline)),
            create_test_opportunity("4", Some(MatchStatus::Suboptimal)),
            create_test_opportunity("5", Some(MatchStatus::Optimal)),
        ]
    }

    fn ids(opps: &[CollectionOpportunity]) -> Vec<&str> {
        opps.iter().map(|o| o.id.as_str()).collect()
    }

    #[test]
    fn test_default_hides_review_statuses() {
        let filtered = filter_opportunities(&mixed_deck(), &FilterState::default());
        assert_eq!(ids(&filtered), vec!["1", "5"]);
    }

    #[test]
    fn test_show_all_returns_everything() {
        let deck = mixed_deck();
        let filtered = filter_opportunities(&deck, &FilterState::default().show_all());
        assert_eq!(filtered, deck);
    }

    #[test]
    fn test_toggle_scenario() {
        let deck = vec![
            create_test_opportunity("1", None),
            create_test_opportunity("2", Some(MatchStatus::Unmatched)),
            create_test_opportunity("3", Some(MatchStatus::Baseline)),
        ];

        let hidden = filter_opportunities(&deck, &FilterState::new("", false));
        assert_eq!(ids(&hidden), vec!["1"]);

        let shown = filter_opportunities(&deck, &FilterState::new("", true));
        assert_eq!(ids(&shown), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_search_is_case_insensitive_on_name() {
        let deck = vec![
            CollectionOpportunity::new("a", "Morning Pass Alpha"),
            CollectionOpportunity::new("b", "Evening Pass Beta"),
        ];
        let filtered = filter_opportunities(&deck, &FilterState::default().with_search("ALPHA"));
        assert_eq!(ids(&filtered), vec!["a"]);
    }

    #[test]
    fn test_search_matches_satellite_status_and_sites() {
        let deck = vec![
            CollectionOpportunity::new("sat", "p1").with_satellite("S1", Some("Landsat-9")),
            CollectionOpportunity::new("status", "p2").with_status(MatchStatus::Baseline),
            CollectionOpportunity::new("site", "p3").with_sites(["GS-Fairbanks", "GS-Troll"]),
        ];
        let show_all = FilterState::default().show_all();

        let by_satellite = filter_opportunities(&deck, &show_all.clone().with_search("landsat"));
        assert_eq!(ids(&by_satellite), vec!["sat"]);

        let by_status = filter_opportunities(&deck, &show_all.clone().with_search("base"));
        assert_eq!(ids(&by_status), vec!["status"]);

        let by_site = filter_opportunities(&deck, &show_all.with_search("troll"));
        assert_eq!(ids(&by_site), vec!["site"]);
    }

    #[test]
    fn test_search_and_quality_tier_combine_with_and() {
        let deck = vec![
            CollectionOpportunity::new("1", "Alpha").with_status(MatchStatus::Unmatched),
            CollectionOpportunity::new("2", "Alpha"),
            CollectionOpportunity::new("3", "Beta"),
        ];
        let filtered = filter_opportunities(&deck, &FilterState::default().with_search("alpha"));
        assert_eq!(ids(&filtered), vec!["2"]);
    }

    #[test]
    fn test_whitespace_query_matches_everything() {
        let deck = mixed_deck();
        let filtered = filter_opportunities(&deck, &FilterState::default().show_all().with_search("   "));
        assert_eq!(filtered.len(), deck.len());
    }

    #[test]
    fn test_unresolved_satellite_fails_open_and_is_reported() {
        let deck = vec![
            CollectionOpportunity::new("broken", "Pass X").with_satellite("SAT-404", None),
            CollectionOpportunity::new("ok", "Pass Y").with_satellite("SAT-1", Some("Aqua")),
        ];
        let sink = RecordingDiagnostics::new();

        let outcome = filter_opportunities_with(
            &deck,
            &FilterState::default().with_search("terra"),
            &sink,
        );

        assert_eq!(outcome.ids(), vec!["broken"]);
        assert_eq!(outcome.faults.len(), 1);
        assert_eq!(sink.len(), 1);
        assert!(matches!(
            &sink.faults()[0],
            FilterFault::MissingField { field: "satellite.name", .. }
        ));
        assert_eq!(sink.faults()[0].opportunity_id().as_str(), "broken");
    }

    #[test]
    fn test_fault_after_match_is_not_reported() {
        let opp = CollectionOpportunity::new("1", "Terra pass").with_satellite("SAT-404", None);
        assert_eq!(matches_search(&opp, "terra"), Ok(true));
    }

    #[test]
    fn test_empty_site_identifier_is_fault() {
        let opp = CollectionOpportunity::new("1", "p").with_sites([""]);
        let sink = RecordingDiagnostics::new();
        let state = FilterState::default().with_search("gs-");

        assert!(opportunity_matches(&opp, &state, &sink));
        assert!(matches!(
            &sink.faults()[0],
            FilterFault::InvalidField { field: "allocated_sites", .. }
        ));
    }

    #[test]
    fn test_faulty_record_still_obeys_quality_tier() {
        let opp = CollectionOpportunity::new("1", "p")
            .with_status(MatchStatus::Unmatched)
            .with_satellite("SAT-404", None);
        let sink = RecordingDiagnostics::new();

        assert!(!opportunity_matches(&opp, &FilterState::default().with_search("x"), &sink));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_filter_is_idempotent() {
        let deck = mixed_deck();
        let state = FilterState::default().with_search("pass");
        let once = filter_opportunities(&deck, &state);
        let twice = filter_opportunities(&once, &state);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_deck() {
        let outcome = filter_opportunities_with(&[], &FilterState::default(), &RecordingDiagnostics::new());
        assert!(outcome.is_empty());
        assert_eq!(outcome.evaluated, 0);
    }
}
