//! Random menu content for the demo host and for tests.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use strum::IntoEnumIterator;
use uuid::Uuid;

use crate::data::api_index::ApiIndexItem;
use crate::data::project::Project;
use crate::data::request::{ArcRequest, Method, RequestKind};

const WORDS: [&str; 16] = [
    "alpha", "orders", "users", "billing", "search", "report", "upload", "token", "session",
    "profile", "catalog", "events", "stock", "invoice", "status", "health",
];
const HOSTS: [&str; 4] = [
    "https://api.domain.com",
    "http://localhost:8080",
    "https://httpbin.org",
    "https://staging.example.org",
];

pub struct DataGenerator {
    rng: StdRng,
    last_time: DateTime<Utc>,
}

#[derive(Default, Clone, Debug)]
pub struct GeneratedData {
    pub projects: Vec<Project>,
    pub saved: Vec<ArcRequest>,
    pub history: Vec<ArcRequest>,
    pub apis: Vec<ApiIndexItem>,
}

impl DataGenerator {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        DataGenerator {
            rng,
            last_time: Utc::now(),
        }
    }

    fn sentence(&mut self, words: usize) -> String {
        let mut parts = vec![];
        for _ in 0..words {
            parts.push(*WORDS.choose(&mut self.rng).unwrap_or(&"request"));
        }
        let mut sentence = parts.join(" ");
        if let Some(first) = sentence.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        sentence
    }

    fn url(&mut self) -> String {
        let host = HOSTS.choose(&mut self.rng).unwrap_or(&HOSTS[0]);
        let path = WORDS.choose(&mut self.rng).unwrap_or(&"path");
        format!("{}/{}/{}", host, path, self.rng.gen_range(1..500))
    }

    fn method(&mut self) -> Method {
        let methods: Vec<Method> = Method::iter().collect();
        methods.choose(&mut self.rng).cloned().unwrap_or_default()
    }

    fn step_back(&mut self) -> DateTime<Utc> {
        // between 30 minutes and a day, like the datastore fixtures
        let minutes = self.rng.gen_range(30..1440);
        self.last_time = self.last_time - Duration::minutes(minutes);
        self.last_time
    }

    pub fn project(&mut self) -> Project {
        Project {
            id: Uuid::new_v4().to_string(),
            rev: None,
            name: self.sentence(2),
            order: 0,
            requests: vec![],
        }
    }

    pub fn saved_request(&mut self, project: Option<&str>) -> ArcRequest {
        let time = self.step_back();
        ArcRequest {
            id: Uuid::new_v4().to_string(),
            rev: None,
            kind: RequestKind::Saved,
            name: self.sentence(2),
            method: self.method(),
            url: self.url(),
            headers: "x-test: true".to_string(),
            payload: String::new(),
            projects: project.map(|p| vec![p.to_string()]).unwrap_or_default(),
            created: time,
            updated: time,
        }
    }

    pub fn history_request(&mut self) -> ArcRequest {
        let time = self.step_back();
        ArcRequest {
            id: Uuid::new_v4().to_string(),
            rev: None,
            kind: RequestKind::History,
            name: String::new(),
            method: self.method(),
            url: self.url(),
            headers: "x-test: true".to_string(),
            payload: String::new(),
            projects: vec![],
            created: time,
            updated: time,
        }
    }

    pub fn api(&mut self, order: i64) -> ApiIndexItem {
        let version = format!("v{}", self.rng.gen_range(1..4));
        ApiIndexItem {
            id: Uuid::new_v4().to_string(),
            rev: None,
            title: format!("{} API", self.sentence(1)),
            order,
            latest: version.clone(),
            versions: vec![version],
        }
    }

    /// Builds a consistent data set: every saved request that names a project
    /// is also listed in that project's `requests`.
    pub fn generate(&mut self, size: usize) -> GeneratedData {
        let mut projects: Vec<Project> = (0..5).map(|_| self.project()).collect();
        let mut saved = vec![];
        for _ in 0..size {
            let index = self.rng.gen_range(0..projects.len());
            let request = self.saved_request(Some(projects[index].id.as_str()));
            projects[index].requests.push(request.id.clone());
            saved.push(request);
        }
        let history = (0..size).map(|_| self.history_request()).collect();
        let apis = (0..3).map(|i| self.api(i)).collect();
        GeneratedData {
            projects,
            saved,
            history,
            apis,
        }
    }
}

impl Default for DataGenerator {
    fn default() -> Self {
        Self::new()
    }
}
