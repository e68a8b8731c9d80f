//! Page state machine
//!
//! Owns one instance of every registered page plus the shared
//! [`PageContext`]. Only the current page sees display events and status
//! pushes. A hook that asks for another page triggers a transition once the
//! hook has returned.

use crate::context::PageContext;
use crate::error::{UiError, UiResult};
use crate::page::{Page, PageKind};
use printhmi_core::{DisplayEvent, StatusSnapshot};
use std::collections::HashMap;

/// Registry of pages and the page currently shown
pub struct PageMachine {
    pages: HashMap<PageKind, Box<dyn Page>>,
    current: PageKind,
    context: PageContext,
}

impl PageMachine {
    /// Create a machine; `initial` is current but its entry hook has not run
    pub fn new(context: PageContext, pages: Vec<Box<dyn Page>>, initial: PageKind) -> Self {
        let pages = pages.into_iter().map(|page| (page.kind(), page)).collect();
        Self {
            pages,
            current: initial,
            context,
        }
    }

    /// Page currently shown
    pub fn current(&self) -> PageKind {
        self.current
    }

    /// Whether `kind` is registered
    pub fn contains(&self, kind: PageKind) -> bool {
        self.pages.contains_key(&kind)
    }

    pub fn context(&self) -> &PageContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut PageContext {
        &mut self.context
    }

    /// Switch to `target`
    ///
    /// The display is told to show the page, then the entry hook runs. The
    /// page becomes current even if the entry hook fails, since the display
    /// has already switched.
    pub async fn transition(&mut self, target: PageKind) -> UiResult<()> {
        let page = self
            .pages
            .get_mut(&target)
            .ok_or(UiError::UnknownPage(target))?;

        tracing::info!("Page {} -> {} ({})", self.current, target, page.name());
        self.context
            .display
            .command(&format!("page {}", page.name()))
            .await?;

        let entered = page.on_enter(&mut self.context).await;
        self.current = target;
        entered
    }

    /// Forward a display event to the current page
    pub async fn dispatch_display_event(&mut self, event: &DisplayEvent) -> UiResult<()> {
        let next = match self.pages.get_mut(&self.current) {
            Some(page) => page.on_event(&mut self.context, event).await?,
            None => return Err(UiError::UnknownPage(self.current)),
        };
        self.follow(next).await
    }

    /// Forward a status snapshot to the current page
    pub async fn dispatch_status_update(&mut self, status: &StatusSnapshot) -> UiResult<()> {
        let next = match self.pages.get_mut(&self.current) {
            Some(page) => page.on_status(&mut self.context, status).await?,
            None => return Err(UiError::UnknownPage(self.current)),
        };
        self.follow(next).await
    }

    async fn follow(&mut self, next: Option<PageKind>) -> UiResult<()> {
        match next {
            Some(target) => self.transition(target).await,
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fake_context, FakeDisplay};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingPage {
        kind: PageKind,
        name: &'static str,
        entered: Arc<AtomicUsize>,
        next: Option<PageKind>,
    }

    #[async_trait]
    impl Page for CountingPage {
        fn kind(&self) -> PageKind {
            self.kind
        }

        fn id(&self) -> u8 {
            0
        }

        fn name(&self) -> &'static str {
            self.name
        }

        async fn on_enter(&mut self, _ctx: &mut PageContext) -> UiResult<()> {
            self.entered.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn on_event(
            &mut self,
            _ctx: &mut PageContext,
            _event: &DisplayEvent,
        ) -> UiResult<Option<PageKind>> {
            Ok(self.next)
        }
    }

    fn machine(display: Arc<FakeDisplay>) -> (PageMachine, Arc<AtomicUsize>) {
        let entered = Arc::new(AtomicUsize::new(0));
        let pages: Vec<Box<dyn Page>> = vec![
            Box::new(CountingPage {
                kind: PageKind::Boot,
                name: "logo",
                entered: Arc::clone(&entered),
                next: Some(PageKind::Main),
            }),
            Box::new(CountingPage {
                kind: PageKind::Main,
                name: "main",
                entered: Arc::clone(&entered),
                next: None,
            }),
        ];
        let (ctx, _commands) = fake_context(display);
        (PageMachine::new(ctx, pages, PageKind::Boot), entered)
    }

    #[tokio::test]
    async fn test_transition_shows_page_then_enters() {
        let display = FakeDisplay::new();
        let (mut machine, entered) = machine(Arc::clone(&display));

        machine.transition(PageKind::Main).await.unwrap();

        assert_eq!(machine.current(), PageKind::Main);
        assert_eq!(entered.load(Ordering::SeqCst), 1);
        assert_eq!(display.commands(), vec!["page main"]);
    }

    #[tokio::test]
    async fn test_unknown_page_is_rejected() {
        let display = FakeDisplay::new();
        let (mut machine, _) = machine(Arc::clone(&display));

        assert!(matches!(
            machine.transition(PageKind::Reset).await,
            Err(UiError::UnknownPage(PageKind::Reset))
        ));
        assert_eq!(machine.current(), PageKind::Boot);
        assert!(display.commands().is_empty());
    }

    #[tokio::test]
    async fn test_event_goes_to_current_page_only() {
        let display = FakeDisplay::new();
        let (mut machine, entered) = machine(Arc::clone(&display));

        machine
            .dispatch_display_event(&DisplayEvent::touch(0, 1, true))
            .await
            .unwrap();
        assert_eq!(machine.current(), PageKind::Main);

        machine
            .dispatch_display_event(&DisplayEvent::touch(3, 1, true))
            .await
            .unwrap();
        assert_eq!(machine.current(), PageKind::Main);
        assert_eq!(entered.load(Ordering::SeqCst), 1);
    }
}
