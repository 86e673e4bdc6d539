//! Candidate discovery: extraction strategies and the concurrent orchestrator.
//!
//! This crate provides:
//! - [`strategies`]: the five name-extraction heuristics behind [`ExtractionStrategy`]
//! - [`StrategyRegistry`]: the strategy set an orchestrator runs
//! - [`orchestrator`]: bounded-concurrency discovery with a per-company deadline
//! - [`cache`]: optional fingerprint-keyed cache of completed runs

pub mod cache;
pub mod orchestrator;
pub mod strategies;

pub use cache::{DiscoveryCache, MemoryCache, fingerprint};
pub use orchestrator::{DiscoveryOutcome, Orchestrator};
pub use strategies::{
    ContactPageStrategy, ExtractionStrategy, NoRegistry, RegistryLookup, RegistryStrategy,
    SignatureStrategy, SocialProfileStrategy, StrategyRegistry, StrategyScope, TeamPageStrategy,
};

#[cfg(test)]
mod tests {
    use super::*;
    use execscout_shared::{CompanyMeta, Document, RawCandidate, StrategySource};

    fn load_fixture(name: &str, url: &str) -> Document {
        let path = format!("../../../fixtures/html/{name}");
        let content = std::fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("missing fixture: {path}"));
        Document::from_html(url, &content)
    }

    fn names(candidates: &[RawCandidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.name.as_str()).collect()
    }

    fn ms_heating() -> (CompanyMeta, Document) {
        (
            CompanyMeta::new("MS Heating and Plumbing", "msheatingandplumbing.co.uk"),
            load_fixture(
                "ms_heating_about.html",
                "https://www.msheatingandplumbing.co.uk/about-us",
            ),
        )
    }

    fn harrow_team() -> (CompanyMeta, Document) {
        (
            CompanyMeta::new("Harrow Electrical Services", "harrowelectrical.co.uk"),
            load_fixture("harrow_team.html", "https://harrowelectrical.co.uk/our-team"),
        )
    }

    // -----------------------------------------------------------------------
    // Team page
    // -----------------------------------------------------------------------

    #[test]
    fn team_page_finds_owner_under_meet_heading() {
        let (company, doc) = ms_heating();
        let found = TeamPageStrategy::new(200).extract(&doc, &company).unwrap();
        let zubair = found.iter().find(|c| c.name == "M Zubair").expect("owner found");

        assert_eq!(zubair.source, StrategySource::TeamPage);
        assert_eq!(zubair.confidence, 0.8);
        assert_eq!(zubair.title_guess.as_deref(), Some("Owner"));
        assert!(zubair.context.contains("Owner of the Business"));
        assert!(zubair.context.chars().count() <= 200);
        assert_eq!(
            &doc.text_content[zubair.document_position..zubair.document_position + 8],
            "M Zubair"
        );
        // Service list and location lines are not team sections or are filtered.
        assert!(!names(&found).contains(&"Emergency Service"));
        assert!(!names(&found).contains(&"West Midlands"));
    }

    #[test]
    fn team_page_lists_every_member_with_titles() {
        let (company, doc) = harrow_team();
        let found = TeamPageStrategy::new(200).extract(&doc, &company).unwrap();

        assert_eq!(names(&found), vec!["Sarah Jones", "David Patel"]);
        assert_eq!(found[0].title_guess.as_deref(), Some("Managing Director"));
        assert_eq!(found[1].title_guess.as_deref(), Some("Operations Manager"));
    }

    #[test]
    fn adjacent_team_lines_keep_their_own_titles() {
        let html = r#"<html><head><title>Our Team</title></head><body><main>
            <h1>Meet the Team</h1>
            <p>Sarah Jones - Managing Director</p>
            <p>David Patel - Office Manager</p>
            <p>Priya Sharma</p>
            <p>Kevin O'Brien - Director</p>
            </main></body></html>"#;
        let doc = Document::from_html("https://example.co.uk/our-team", html);
        let company = CompanyMeta::new("Example Electrical", "example.co.uk");
        let found = TeamPageStrategy::new(200).extract(&doc, &company).unwrap();

        let titles: Vec<(&str, Option<&str>)> = found
            .iter()
            .map(|c| (c.name.as_str(), c.title_guess.as_deref()))
            .collect();
        assert_eq!(
            titles,
            vec![
                ("Sarah Jones", Some("Managing Director")),
                ("David Patel", Some("Office Manager")),
                ("Priya Sharma", None),
                ("Kevin O'Brien", Some("Director")),
            ]
        );
    }

    #[test]
    fn team_page_skips_contact_pages() {
        let doc = load_fixture("meregreen_contact.html", "https://meregreengasandplumbing.co.uk/contact");
        assert!(!TeamPageStrategy::new(200).accepts(&doc));
    }

    // -----------------------------------------------------------------------
    // Contact page
    // -----------------------------------------------------------------------

    #[test]
    fn contact_page_prefers_explicit_phrasing() {
        let company = CompanyMeta::new("Mere Green Gas and Plumbing", "meregreengasandplumbing.co.uk");
        let doc = load_fixture("meregreen_contact.html", "https://meregreengasandplumbing.co.uk/contact");
        let found = ContactPageStrategy::new(200).extract(&doc, &company).unwrap();

        assert_eq!(names(&found), vec!["Gary Thompson"]);
        assert_eq!(found[0].confidence, 0.9);
        assert_eq!(found[0].title_guess.as_deref(), Some("Owner"));
    }

    #[test]
    fn contact_page_scans_get_in_touch_sections() {
        let (company, doc) = harrow_team();
        let found = ContactPageStrategy::new(200).extract(&doc, &company).unwrap();

        assert_eq!(names(&found), vec!["Robert Clarke"]);
        assert_eq!(found[0].confidence, 0.7);
        assert_eq!(found[0].title_guess.as_deref(), Some("Director"));
    }

    #[test]
    fn contact_page_handles_nicknames_verbatim() {
        let company = CompanyMeta::new("Harrow Electrical Services", "harrowelectrical.co.uk");
        let doc = load_fixture("harrow_contact.html", "https://harrowelectrical.co.uk/contact");
        let found = ContactPageStrategy::new(200).extract(&doc, &company).unwrap();
        assert_eq!(names(&found), vec!["Bob Clarke"]);
        assert_eq!(found[0].title_guess, None);
    }

    // -----------------------------------------------------------------------
    // Signature
    // -----------------------------------------------------------------------

    #[test]
    fn signature_after_sign_off() {
        let (company, doc) = harrow_team();
        let found = SignatureStrategy::new(200).extract(&doc, &company).unwrap();
        assert_eq!(names(&found), vec!["Robert Clarke"]);
        assert_eq!(found[0].confidence, 0.8);
    }

    #[test]
    fn signature_reads_footer_names_weakly() {
        let html = r#"<html><body><main><p>We fix boilers.</p></main>
            <footer><p>Company director: Priya Sharma</p><p>Registered in England</p></footer></body></html>"#;
        let doc = Document::from_html("https://example.co.uk/", html);
        let company = CompanyMeta::new("Example", "example.co.uk");
        let found = SignatureStrategy::new(200).extract(&doc, &company).unwrap();

        assert_eq!(names(&found), vec!["Priya Sharma"]);
        assert_eq!(found[0].confidence, 0.6);
    }

    #[test]
    fn signature_ignores_pages_without_sign_offs() {
        let (company, doc) = ms_heating();
        let found = SignatureStrategy::new(200).extract(&doc, &company).unwrap();
        // The footer only holds the copyright line, which is left to the classifier.
        assert!(found.iter().all(|c| c.confidence == 0.6));
        assert!(!names(&found).contains(&"M Zubair"));
    }

    // -----------------------------------------------------------------------
    // Social profile
    // -----------------------------------------------------------------------

    #[test]
    fn social_profile_reads_linkedin_slug_once() {
        let (company, doc) = harrow_team();
        let found = SocialProfileStrategy::new(200).extract(&doc, &company).unwrap();

        assert_eq!(names(&found), vec!["Sarah Jones"]);
        assert_eq!(found[0].confidence, 0.7);
        assert!(found[0].document_position < doc.text_content.len());
    }

    #[test]
    fn social_profile_uses_markup_only_links() {
        let html = r#"<html><body><p>Find us on <a href="https://uk.linkedin.com/in/gary-thompson-0b1">LinkedIn</a></p></body></html>"#;
        let doc = Document::from_html("https://meregreengasandplumbing.co.uk/", html);
        let company = CompanyMeta::new("Mere Green", "meregreengasandplumbing.co.uk");
        let found = SocialProfileStrategy::new(200).extract(&doc, &company).unwrap();

        assert_eq!(names(&found), vec!["Gary Thompson"]);
        assert_eq!(found[0].document_position, doc.text_content.len());
    }

    // -----------------------------------------------------------------------
    // Orchestrated
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn discovery_over_fixture_pages_is_deterministic() {
        let company = CompanyMeta::new("Harrow Electrical Services", "harrowelectrical.co.uk");
        let docs: std::sync::Arc<[Document]> = vec![
            load_fixture("harrow_team.html", "https://harrowelectrical.co.uk/our-team"),
            load_fixture("harrow_contact.html", "https://harrowelectrical.co.uk/contact"),
        ]
        .into();
        let orchestrator = Orchestrator::new(Default::default());

        let first = orchestrator.discover(&company, docs.clone()).await;
        let second = orchestrator.discover(&company, docs).await;

        assert!(first.warnings.is_empty());
        assert_eq!(first.candidates, second.candidates);

        let bob = first.candidates.iter().find(|c| c.name == "Bob Clarke").unwrap();
        assert_eq!(bob.document_index, 1);
        let sources: Vec<StrategySource> = first
            .candidates
            .iter()
            .filter(|c| c.name == "Robert Clarke")
            .map(|c| c.source)
            .collect();
        assert_eq!(sources, vec![StrategySource::ContactPage, StrategySource::Signature]);
    }
}
