//! Role-keyed question banks.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{Category, Difficulty, Question, Role};

/// An ordered list of questions per role. Read-only once built.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionBank {
    /// Bank identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    questions: BTreeMap<Role, Vec<Question>>,
}

impl QuestionBank {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            questions: BTreeMap::new(),
        }
    }

    /// Append a question to a role's sequence.
    pub fn push(&mut self, role: Role, question: Question) {
        self.questions.entry(role).or_default().push(question);
    }

    /// Questions for a role, in interview order. Empty if the role has none.
    pub fn questions_for(&self, role: Role) -> &[Question] {
        self.questions.get(&role).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Find a question by id within a role.
    pub fn find(&self, role: Role, id: &str) -> Option<&Question> {
        self.questions_for(role).iter().find(|q| q.id == id)
    }

    /// Roles that have at least one question.
    pub fn roles(&self) -> impl Iterator<Item = Role> + '_ {
        self.questions
            .iter()
            .filter(|(_, qs)| !qs.is_empty())
            .map(|(role, _)| *role)
    }

    /// Every (role, question) pair.
    pub fn iter(&self) -> impl Iterator<Item = (Role, &Question)> {
        self.questions
            .iter()
            .flat_map(|(role, qs)| qs.iter().map(move |q| (*role, q)))
    }

    pub fn len(&self) -> usize {
        self.questions.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Merge another bank's questions after this bank's.
    pub fn extend(&mut self, other: QuestionBank) {
        for (role, qs) in other.questions {
            self.questions.entry(role).or_default().extend(qs);
        }
    }

    /// The bundled bank: four questions for each role.
    pub fn builtin() -> Self {
        let mut bank = QuestionBank::new("builtin", "Built-in questions");

        bank.push(
            Role::Frontend,
            question(
                "fe-1",
                Category::Behavioral,
                "Tell me about a time when you had to optimize a slow-loading web application. What was your approach?",
                Difficulty::Medium,
                &["Consider metrics", "User impact", "Technical solutions"],
                &["performance", "optimization", "loading", "metrics", "user experience"],
                "What tools did you use to identify the bottlenecks?",
            ),
        );
        bank.push(
            Role::Frontend,
            question(
                "fe-2",
                Category::Technical,
                "Explain the difference between controlled and uncontrolled components in React.",
                Difficulty::Medium,
                &["State management", "Form handling", "React patterns"],
                &["state", "props", "ref", "controlled", "uncontrolled"],
                "When would you choose one over the other?",
            ),
        );
        bank.push(
            Role::Frontend,
            question(
                "fe-3",
                Category::Coding,
                "Write a function to debounce user input in a search box. Explain why debouncing is important.",
                Difficulty::Easy,
                &["setTimeout", "clearTimeout", "Performance"],
                &["debounce", "setTimeout", "performance", "API calls"],
                "How would you test this function?",
            ),
        );
        bank.push(
            Role::Frontend,
            question(
                "fe-4",
                Category::Technical,
                "How would you implement server-side rendering in a React application? What are the benefits?",
                Difficulty::Hard,
                &["SEO", "Initial load", "Hydration"],
                &["SSR", "SEO", "performance", "hydration", "Next.js"],
                "What challenges might you face with SSR?",
            ),
        );

        bank.push(
            Role::Backend,
            question(
                "be-1",
                Category::Behavioral,
                "Describe a situation where you had to design a scalable API. What considerations did you make?",
                Difficulty::Hard,
                &["Load balancing", "Caching", "Database design"],
                &["scalability", "API", "load", "caching", "database"],
                "How did you handle authentication?",
            ),
        );
        bank.push(
            Role::Backend,
            question(
                "be-2",
                Category::Technical,
                "Explain the CAP theorem and how it applies to distributed systems.",
                Difficulty::Hard,
                &["Consistency", "Availability", "Partition tolerance"],
                &["CAP", "consistency", "availability", "partition", "distributed"],
                "Can you give a real-world example?",
            ),
        );
        bank.push(
            Role::Backend,
            question(
                "be-3",
                Category::SystemDesign,
                "Design a URL shortening service like bit.ly. What are the key components?",
                Difficulty::Hard,
                &["Hashing", "Database", "Scalability"],
                &["hash", "database", "redirect", "scalability", "collision"],
                "How would you handle collision resolution?",
            ),
        );
        bank.push(
            Role::Backend,
            question(
                "be-4",
                Category::Technical,
                "What is the difference between SQL and NoSQL databases? When would you use each?",
                Difficulty::Medium,
                &["Structure", "Scalability", "Use cases"],
                &["SQL", "NoSQL", "relational", "document", "scalability"],
                "What about consistency guarantees?",
            ),
        );

        bank.push(
            Role::Fullstack,
            question(
                "fs-1",
                Category::Behavioral,
                "Tell me about a full-stack project you built from scratch. What was the most challenging part?",
                Difficulty::Medium,
                &["Architecture", "Frontend-backend integration", "Deployment"],
                &["full-stack", "frontend", "backend", "integration", "deployment"],
                "How did you handle state management across the stack?",
            ),
        );
        bank.push(
            Role::Fullstack,
            question(
                "fs-2",
                Category::Technical,
                "How would you implement real-time notifications in a web application?",
                Difficulty::Hard,
                &["WebSockets", "Polling", "Server-sent events"],
                &["WebSocket", "real-time", "notifications", "socket.io", "SSE"],
                "What about mobile push notifications?",
            ),
        );
        bank.push(
            Role::Fullstack,
            question(
                "fs-3",
                Category::SystemDesign,
                "Design a social media feed with infinite scroll. Consider both frontend and backend.",
                Difficulty::Hard,
                &["Pagination", "Caching", "Performance"],
                &["pagination", "infinite scroll", "caching", "performance", "API"],
                "How would you handle new posts appearing in real-time?",
            ),
        );
        bank.push(
            Role::Fullstack,
            question(
                "fs-4",
                Category::Technical,
                "Explain JWT authentication and its advantages over session-based auth.",
                Difficulty::Medium,
                &["Stateless", "Token", "Security"],
                &["JWT", "token", "stateless", "authentication", "security"],
                "Where would you store the JWT on the client?",
            ),
        );

        bank.push(
            Role::Data,
            question(
                "de-1",
                Category::Behavioral,
                "Describe a time when you had to work with messy, unstructured data. How did you clean and process it?",
                Difficulty::Medium,
                &["Data quality", "ETL", "Tools"],
                &["data cleaning", "ETL", "pipeline", "quality", "transformation"],
                "What tools did you use for this task?",
            ),
        );
        bank.push(
            Role::Data,
            question(
                "de-2",
                Category::Technical,
                "Explain the difference between a data warehouse and a data lake.",
                Difficulty::Medium,
                &["Structure", "Storage", "Use cases"],
                &["warehouse", "lake", "structured", "unstructured", "schema"],
                "When would you choose one over the other?",
            ),
        );
        bank.push(
            Role::Data,
            question(
                "de-3",
                Category::Coding,
                "Write a SQL query to find the top 5 customers by total purchase amount in the last year.",
                Difficulty::Easy,
                &["JOIN", "GROUP BY", "ORDER BY"],
                &["SELECT", "JOIN", "GROUP BY", "ORDER BY", "LIMIT"],
                "How would you optimize this query for a large dataset?",
            ),
        );
        bank.push(
            Role::Data,
            question(
                "de-4",
                Category::Technical,
                "How would you design a real-time data pipeline for streaming analytics?",
                Difficulty::Hard,
                &["Kafka", "Spark", "Stream processing"],
                &["streaming", "Kafka", "pipeline", "real-time", "processing"],
                "What about fault tolerance and data recovery?",
            ),
        );

        bank.push(
            Role::Ml,
            question(
                "ml-1",
                Category::Behavioral,
                "Tell me about a machine learning model you deployed to production. What challenges did you face?",
                Difficulty::Hard,
                &["Deployment", "Monitoring", "Performance"],
                &["model", "deployment", "production", "monitoring", "MLOps"],
                "How did you handle model drift?",
            ),
        );
        bank.push(
            Role::Ml,
            question(
                "ml-2",
                Category::Technical,
                "Explain the bias-variance tradeoff and how it relates to overfitting.",
                Difficulty::Medium,
                &["Model complexity", "Generalization", "Training vs test"],
                &["bias", "variance", "overfitting", "underfitting", "generalization"],
                "How would you detect overfitting in your model?",
            ),
        );
        bank.push(
            Role::Ml,
            question(
                "ml-3",
                Category::Technical,
                "What is the difference between supervised and unsupervised learning? Give examples.",
                Difficulty::Easy,
                &["Labels", "Training data", "Use cases"],
                &["supervised", "unsupervised", "labels", "classification", "clustering"],
                "What about semi-supervised learning?",
            ),
        );
        bank.push(
            Role::Ml,
            question(
                "ml-4",
                Category::SystemDesign,
                "Design a recommendation system for an e-commerce platform. What algorithms would you use?",
                Difficulty::Hard,
                &["Collaborative filtering", "Content-based", "Hybrid"],
                &["recommendation", "collaborative", "filtering", "matrix", "similarity"],
                "How would you handle the cold start problem?",
            ),
        );

        bank
    }
}

fn question(
    id: &str,
    category: Category,
    prompt: &str,
    difficulty: Difficulty,
    hints: &[&str],
    expected_keywords: &[&str],
    follow_up: &str,
) -> Question {
    Question {
        id: id.to_string(),
        category,
        prompt: prompt.to_string(),
        difficulty,
        hints: hints.iter().map(|h| h.to_string()).collect(),
        expected_keywords: expected_keywords.iter().map(|k| k.to_string()).collect(),
        follow_up: Some(follow_up.to_string()),
    }
}
