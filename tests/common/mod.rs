// tests/common/mod.rs
#![allow(dead_code)]

use async_trait::async_trait;
use lecture_spider::{
    config::{AppConfig, Selectors},
    credentials::Prompter,
    discover::{HEIGHT_SCRIPT, SCROLL_SCRIPT},
    driver::{PageDriver, PageElement},
    error::{SpiderError, SpiderResult},
    locator::Locator,
};
use serde_json::{json, Value};
use std::{
    collections::{HashMap, VecDeque},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::time::Instant;

pub const COURSE_URL: &str = "https://portal.example.ac.uk/ultra/courses/_1_1/outline";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Goto(String),
    Click(String),
    ClickFailed(String),
    Download(String),
    Input(String, String),
    SetDownloadDir(PathBuf),
    Quit,
}

/// One element of the page model.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub locator: String,
    pub text: String,
    pub attrs: HashMap<String, String>,
    /// Only present while this URL is loaded.
    pub page: Option<String>,
    /// Only present while the named folder node is expanded.
    pub inside: Option<String>,
    pub appears_after: Duration,
    pub broken: bool,
}

impl Node {
    pub fn new(name: &str, locator: &Locator) -> Self {
        Self {
            name: name.to_string(),
            locator: locator.as_str().to_string(),
            text: String::new(),
            attrs: HashMap::new(),
            page: None,
            inside: None,
            appears_after: Duration::ZERO,
            broken: false,
        }
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn on_page(mut self, url: &str) -> Self {
        self.page = Some(url.to_string());
        self
    }

    pub fn inside(mut self, folder: &str) -> Self {
        self.inside = Some(folder.to_string());
        self
    }

    pub fn appears_after(mut self, delay: Duration) -> Self {
        self.appears_after = delay;
        self
    }

    pub fn broken(mut self) -> Self {
        self.broken = true;
        self
    }
}

struct PageState {
    started: Instant,
    nodes: Vec<Node>,
    events: Vec<Event>,
    url: Option<String>,
    height: i64,
    pending_heights: VecDeque<i64>,
    scrolls: usize,
}

impl PageState {
    fn is_visible(&self, node: &Node) -> bool {
        if self.started.elapsed() < node.appears_after {
            return false;
        }
        if let Some(page) = &node.page {
            if self.url.as_deref() != Some(page.as_str()) {
                return false;
            }
        }
        match &node.inside {
            Some(folder) => self.nodes.iter().any(|n| {
                &n.name == folder && n.attrs.get("aria-expanded").map(String::as_str) == Some("true")
            }),
            None => true,
        }
    }
}

/// In-memory page model driven through the [`PageDriver`] capability.
#[derive(Clone)]
pub struct FakePage {
    state: Arc<Mutex<PageState>>,
}

impl FakePage {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(PageState {
                started: Instant::now(),
                nodes: Vec::new(),
                events: Vec::new(),
                url: None,
                height: 1000,
                pending_heights: VecDeque::new(),
                scrolls: 0,
            })),
        }
    }

    pub fn add(&self, node: Node) -> &Self {
        self.state.lock().unwrap().nodes.push(node);
        self
    }

    /// Heights the document reports after each successive scroll.
    pub fn grow_heights(&self, heights: &[i64]) {
        self.state
            .lock()
            .unwrap()
            .pending_heights
            .extend(heights.iter().copied());
    }

    pub fn events(&self) -> Vec<Event> {
        self.state.lock().unwrap().events.clone()
    }

    pub fn clear_events(&self) {
        self.state.lock().unwrap().events.clear();
    }

    pub fn clicks(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Click(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    pub fn downloads(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Download(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    pub fn visited(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Goto(url) => Some(url),
                _ => None,
            })
            .collect()
    }

    pub fn quit_count(&self) -> usize {
        self.events().iter().filter(|e| **e == Event::Quit).count()
    }

    pub fn scrolls(&self) -> usize {
        self.state.lock().unwrap().scrolls
    }

    pub fn attr_of(&self, name: &str, attr: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        state
            .nodes
            .iter()
            .find(|n| n.name == name)
            .and_then(|n| n.attrs.get(attr).cloned())
    }
}

#[async_trait]
impl PageDriver for FakePage {
    type Element = FakeElement;

    async fn goto(&self, url: &str) -> SpiderResult<()> {
        let mut state = self.state.lock().unwrap();
        state.url = Some(url.to_string());
        state.events.push(Event::Goto(url.to_string()));
        Ok(())
    }

    async fn find_all(&self, locator: &Locator) -> SpiderResult<Vec<FakeElement>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.locator == locator.as_str() && state.is_visible(n))
            .map(|(index, _)| FakeElement {
                state: self.state.clone(),
                index,
            })
            .collect())
    }

    async fn execute(&self, script: &str) -> SpiderResult<Value> {
        let mut state = self.state.lock().unwrap();
        if script == HEIGHT_SCRIPT {
            return Ok(json!(state.height));
        }
        if script == SCROLL_SCRIPT {
            state.scrolls += 1;
            if let Some(height) = state.pending_heights.pop_front() {
                state.height = height;
            }
        }
        Ok(Value::Null)
    }

    async fn set_download_dir(&self, dir: &Path) -> SpiderResult<()> {
        self.state
            .lock()
            .unwrap()
            .events
            .push(Event::SetDownloadDir(dir.to_path_buf()));
        Ok(())
    }

    async fn quit(&self) -> SpiderResult<()> {
        self.state.lock().unwrap().events.push(Event::Quit);
        Ok(())
    }
}

pub struct FakeElement {
    state: Arc<Mutex<PageState>>,
    index: usize,
}

impl FakeElement {
    fn activate(&self, download: bool) -> SpiderResult<()> {
        let mut state = self.state.lock().unwrap();
        let node = state.nodes[self.index].clone();
        if node.broken {
            state.events.push(Event::ClickFailed(node.name.clone()));
            return Err(SpiderError::Driver(format!(
                "element '{}' is not interactable",
                node.name
            )));
        }

        if download {
            state.events.push(Event::Download(node.name));
            return Ok(());
        }

        if let Some(expanded) = state.nodes[self.index].attrs.get_mut("aria-expanded") {
            let toggled = if *expanded == "true" { "false" } else { "true" };
            *expanded = toggled.to_string();
        }
        state.events.push(Event::Click(node.name));
        Ok(())
    }
}

#[async_trait]
impl PageElement for FakeElement {
    async fn text(&self) -> SpiderResult<String> {
        Ok(self.state.lock().unwrap().nodes[self.index].text.clone())
    }

    async fn attr(&self, name: &str) -> SpiderResult<Option<String>> {
        Ok(self.state.lock().unwrap().nodes[self.index]
            .attrs
            .get(name)
            .cloned())
    }

    async fn click(&self) -> SpiderResult<()> {
        self.activate(false)
    }

    async fn click_to_download(&self) -> SpiderResult<()> {
        self.activate(true)
    }

    async fn send_keys(&self, text: &str) -> SpiderResult<()> {
        let mut state = self.state.lock().unwrap();
        let name = state.nodes[self.index].name.clone();
        state.events.push(Event::Input(name, text.to_string()));
        Ok(())
    }
}

/// Answers prompts from a fixed script and records every question.
#[derive(Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    pub asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|a| a.to_string()).collect(),
            asked: Vec::new(),
        }
    }

    fn next(&mut self, prompt: &str) -> SpiderResult<String> {
        self.asked.push(prompt.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| SpiderError::Input(format!("no scripted answer for {prompt:?}")))
    }
}

impl Prompter for ScriptedPrompter {
    fn line(&mut self, prompt: &str) -> SpiderResult<String> {
        self.next(prompt)
    }

    fn secret(&mut self, prompt: &str) -> SpiderResult<String> {
        self.next(prompt)
    }
}

/// Config with credentials, pointing downloads into `dir`.
pub fn test_config(dir: &Path) -> AppConfig {
    AppConfig {
        username: Some("u".to_string()),
        password: Some("p".to_string()),
        download_path: dir.join("downloads"),
        course_url: COURSE_URL.to_string(),
        ..AppConfig::default()
    }
}

pub struct Week<'a> {
    pub label: &'a str,
    pub content_id: &'a str,
    pub expanded: bool,
    /// (title, href) pairs in document order.
    pub links: Vec<(&'a str, &'a str)>,
}

impl<'a> Week<'a> {
    pub fn collapsed(label: &'a str, content_id: &'a str, links: Vec<(&'a str, &'a str)>) -> Self {
        Self {
            label,
            content_id,
            expanded: false,
            links,
        }
    }
}

/// Login form, a collapsed Lectures folder and the given week folders, all on
/// [`COURSE_URL`]. Week buttons are named `week-<n>` and live inside the
/// Lectures folder; links live inside their week.
pub fn course_page(page: &FakePage, selectors: &Selectors, weeks: &[Week<'_>]) {
    page.add(Node::new("username", &selectors.username).on_page(COURSE_URL))
        .add(Node::new("password", &selectors.password).on_page(COURSE_URL))
        .add(Node::new("login", &selectors.login_button).on_page(COURSE_URL))
        .add(
            Node::new("lectures", &selectors.lectures_button)
                .text("Lectures & Practical Sessions")
                .attr("aria-expanded", "false")
                .on_page(COURSE_URL),
        );

    for (index, week) in weeks.iter().enumerate() {
        let name = format!("week-{}", index + 1);
        page.add(
            Node::new(&name, &selectors.week_buttons)
                .text(week.label)
                .attr("aria-controls", week.content_id)
                .attr("aria-expanded", if week.expanded { "true" } else { "false" })
                .on_page(COURSE_URL)
                .inside("lectures"),
        );

        let links_locator = selectors.content_links.render(week.content_id).unwrap();
        for (title, href) in &week.links {
            page.add(
                Node::new(&format!("{name}: {title}"), &links_locator)
                    .text(title)
                    .attr("href", href)
                    .on_page(COURSE_URL)
                    .inside(&name),
            );
        }
    }
}

/// A content page at `url` that is ready immediately.
pub fn content_page(page: &FakePage, selectors: &Selectors, url: &str) {
    page.add(Node::new(&format!("ready {url}"), &selectors.page_ready).on_page(url));
}
