use std::collections::{BTreeSet, HashSet};
use std::fmt;
use url::Url;

/// Where a domain crawl currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlPhase {
    Initializing,
    Traversing { depth: u32 },
    ExtractingDetailPages,
    Done,
}

impl CrawlPhase {
    /// Checks whether moving to `next` follows the crawl's state machine
    ///
    /// `Initializing -> Traversing(0) -> Traversing(n+1) -> ExtractingDetailPages -> Done`,
    /// with `Initializing -> Done` for unsupported vendors.
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        use CrawlPhase::*;
        match (self, next) {
            (Initializing, Traversing { depth: 0 }) => true,
            (Initializing, Done) => true,
            (Traversing { depth }, Traversing { depth: next }) => next == depth + 1,
            (Traversing { .. }, ExtractingDetailPages) => true,
            (ExtractingDetailPages, Done) => true,
            _ => false,
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initializing => write!(f, "initializing"),
            Self::Traversing { depth } => write!(f, "traversing(depth={})", depth),
            Self::ExtractingDetailPages => write!(f, "extracting"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// How a discovered link is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkClass {
    /// Under an excluded prefix; dropped
    Excluded,
    /// Looks like a car listing; fetched in the extraction phase
    DetailPage,
    /// Anything else on the host; fetched in the next batch
    Frontier,
}

/// Visited set, frontier and discovered detail pages of one domain crawl
#[derive(Debug)]
pub struct CrawlState {
    phase: CrawlPhase,
    visited: HashSet<Url>,
    frontier: BTreeSet<Url>,
    detail_pages: BTreeSet<Url>,
    current_depth: u32,
}

impl Default for CrawlState {
    fn default() -> Self {
        Self::new()
    }
}

impl CrawlState {
    pub fn new() -> Self {
        Self {
            phase: CrawlPhase::Initializing,
            visited: HashSet::new(),
            frontier: BTreeSet::new(),
            detail_pages: BTreeSet::new(),
            current_depth: 0,
        }
    }

    /// Puts the root in the frontier and starts traversal at depth 0
    pub fn seed(&mut self, root: Url) {
        self.transition(CrawlPhase::Traversing { depth: 0 });
        self.frontier.insert(root);
    }

    /// True while there is a frontier and depth remains
    pub fn should_traverse(&self, max_depth: u32) -> bool {
        !self.frontier.is_empty() && self.current_depth < max_depth
    }

    /// Drains the frontier into a batch and marks every URL in it visited
    ///
    /// With a page budget, the batch is cut so the total number of visited
    /// pages never exceeds it; the rest of the frontier is discarded.
    pub fn take_batch(&mut self, page_budget: Option<usize>) -> Vec<Url> {
        let mut batch: Vec<Url> = std::mem::take(&mut self.frontier)
            .into_iter()
            .filter(|url| !self.visited.contains(url))
            .collect();

        if let Some(budget) = page_budget {
            let remaining = budget.saturating_sub(self.visited.len());
            batch.truncate(remaining);
        }

        for url in &batch {
            self.visited.insert(url.clone());
        }

        batch
    }

    /// Records a link found on a fetched page
    ///
    /// Links already visited, queued or known as detail pages are ignored,
    /// so a URL discovered twice in one batch is enqueued once. Returns
    /// true when the link was new.
    pub fn record_link(&mut self, url: Url, class: LinkClass) -> bool {
        if self.visited.contains(&url) {
            return false;
        }

        match class {
            LinkClass::Excluded => false,
            LinkClass::DetailPage => self.detail_pages.insert(url),
            LinkClass::Frontier => {
                if self.detail_pages.contains(&url) {
                    return false;
                }
                self.frontier.insert(url)
            }
        }
    }

    /// Closes the current batch and moves one level deeper
    pub fn finish_batch(&mut self) {
        self.current_depth += 1;
        self.transition(CrawlPhase::Traversing {
            depth: self.current_depth,
        });
    }

    /// Ends traversal and hands out the detail pages to fetch
    pub fn begin_extraction(&mut self) -> Vec<Url> {
        self.transition(CrawlPhase::ExtractingDetailPages);
        self.detail_pages.iter().cloned().collect()
    }

    pub fn finish(&mut self) {
        self.transition(CrawlPhase::Done);
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    pub fn current_depth(&self) -> u32 {
        self.current_depth
    }

    pub fn visited(&self) -> &HashSet<Url> {
        &self.visited
    }

    pub fn frontier(&self) -> &BTreeSet<Url> {
        &self.frontier
    }

    pub fn detail_pages(&self) -> &BTreeSet<Url> {
        &self.detail_pages
    }

    fn transition(&mut self, next: CrawlPhase) {
        debug_assert!(
            self.phase.can_transition_to(next),
            "invalid crawl transition {} -> {}",
            self.phase,
            next
        );
        tracing::trace!("Crawl phase {} -> {}", self.phase, next);
        self.phase = next;
    }
}
