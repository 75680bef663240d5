//! Academic search on top of the prompt proxy.
//!
//! A search asks the prompt proxy for an analysis of the topic, then
//! narrows a fixed paper list to the entries whose title, authors or
//! abstract mention the query. The paper list is only filtered once the
//! analysis succeeded; a prompt failure fails the whole search.

use tracing::debug;

use crate::error::ClientError;
use crate::prompt::PromptProxyClient;

/// Token budget for the topic analysis.
pub const SEARCH_MAX_TOKENS: u32 = 300;

/// One entry of the paper list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paper {
    /// Stable identifier.
    pub id: u32,
    /// Paper title.
    pub title: String,
    /// Author list as displayed.
    pub authors: String,
    /// Journal the paper appeared in.
    pub journal: String,
    /// Publication year.
    pub year: u16,
    /// Short abstract.
    pub r#abstract: String,
    /// DOI without the resolver prefix.
    pub doi: String,
    /// Citation count.
    pub citations: u32,
}

impl Paper {
    fn matches(&self, needle: &str) -> bool {
        [&self.title, &self.authors, &self.r#abstract]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

/// Result of a successful search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    /// Topic analysis returned by the prompt proxy.
    pub analysis: String,
    /// Papers matching the query.
    pub papers: Vec<Paper>,
}

/// Prompt sent to the proxy for `query`.
pub fn search_prompt(query: &str) -> String {
    format!(
        "Search for academic papers and research related to: {query}. Provide a comprehensive \
         analysis of the topic, including key research areas, recent developments, and potential \
         papers that might be relevant."
    )
}

/// Papers whose title, authors or abstract contain `query`, ignoring case.
///
/// A blank query matches every paper.
pub fn filter_papers(papers: &[Paper], query: &str) -> Vec<Paper> {
    let needle = query.trim().to_lowercase();
    papers.iter().filter(|p| p.matches(&needle)).cloned().collect()
}

/// One-line summary shown when a paper is picked from the results.
pub fn describe_selection(paper: &Paper) -> String {
    format!(
        "Selected paper: \"{}\" by {} ({}). This paper has {} citations and is published in {}.",
        paper.title, paper.authors, paper.year, paper.citations, paper.journal
    )
}

/// The built-in paper list.
pub fn mock_papers() -> Vec<Paper> {
    vec![
        paper(
            1,
            "Machine Learning Applications in Educational Technology",
            "Smith, J., Johnson, A., Williams, B.",
            "Journal of Educational Technology",
            2024,
            "This paper explores the integration of machine learning algorithms in educational \
             platforms to enhance student learning outcomes...",
            "10.1234/jet.2024.001",
            45,
        ),
        paper(
            2,
            "The Impact of Digital Libraries on Academic Research",
            "Brown, C., Davis, E., Miller, F.",
            "Information Science Quarterly",
            2023,
            "A comprehensive study of how digital libraries have transformed the way students and \
             researchers access academic resources...",
            "10.1234/isq.2023.002",
            32,
        ),
        paper(
            3,
            "Open Access Publishing: Trends and Challenges",
            "Garcia, H., Rodriguez, I., Martinez, J.",
            "Academic Publishing Review",
            2024,
            "Analysis of the growing trend towards open access publishing and its implications for \
             academic institutions...",
            "10.1234/apr.2024.003",
            28,
        ),
        paper(
            4,
            "Citation Analysis in Modern Academic Research",
            "Taylor, K., Anderson, L., Wilson, M.",
            "Research Methodology Today",
            2023,
            "Examination of citation patterns and their impact on research visibility and academic \
             reputation...",
            "10.1234/rmt.2023.004",
            67,
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
fn paper(
    id: u32,
    title: &str,
    authors: &str,
    journal: &str,
    year: u16,
    r#abstract: &str,
    doi: &str,
    citations: u32,
) -> Paper {
    Paper {
        id,
        title: title.to_owned(),
        authors: authors.to_owned(),
        journal: journal.to_owned(),
        year,
        r#abstract: r#abstract.to_owned(),
        doi: doi.to_owned(),
        citations,
    }
}

/// Topic search backed by the prompt proxy.
#[derive(Debug, Clone)]
pub struct AcademicSearch {
    prompt: PromptProxyClient,
    papers: Vec<Paper>,
}

impl AcademicSearch {
    /// Search over the built-in paper list.
    pub fn new(prompt: PromptProxyClient) -> Self {
        Self::with_papers(prompt, mock_papers())
    }

    /// Search over an explicit paper list.
    pub const fn with_papers(prompt: PromptProxyClient, papers: Vec<Paper>) -> Self {
        Self { prompt, papers }
    }

    /// Run a search for `query`.
    ///
    /// A blank query fails with [`ClientError::Validation`] without
    /// touching the network. Prompt proxy errors pass through unchanged.
    pub async fn search(&self, query: &str) -> Result<SearchOutcome, ClientError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ClientError::Validation("Search query is required".to_owned()));
        }

        let analysis = self.prompt.ask(&search_prompt(query), SEARCH_MAX_TOKENS).await?;
        let papers = filter_papers(&self.papers, query);
        debug!(matches = papers.len(), "search answered");
        Ok(SearchOutcome { analysis, papers })
    }
}
