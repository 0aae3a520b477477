use crate::{AnalysisResult, Sentiment, Source, Task, TaskCollection};

/// Demo tasks shown when nothing usable is stored yet.
///
/// `now_ms` anchors the creation times so the tasks look recent.
pub fn seed_tasks(now_ms: i64) -> TaskCollection {
    [
        Task::completed(
            "demo-1",
            "https://en.wikipedia.org/wiki/Artificial_intelligence",
            now_ms - 10_000_000,
            AnalysisResult {
                title: "Artificial intelligence - Wikipedia".to_string(),
                summary: "Artificial intelligence (AI) is intelligence demonstrated by machines, \
                          as opposed to the natural intelligence displayed by humans and other \
                          animals. Example tasks in which this is done include speech recognition, \
                          computer vision, translation between (natural) languages, as well as \
                          other mappings of inputs."
                    .to_string(),
                keywords: strings(&[
                    "Artificial Intelligence",
                    "Machine Learning",
                    "Computer Science",
                    "Neural Networks",
                    "Cognitive Computing",
                ]),
                sentiment: Sentiment::Neutral,
                main_entities: strings(&[
                    "Alan Turing",
                    "Dartmouth College",
                    "DeepMind",
                    "OpenAI",
                    "Google",
                ]),
                estimated_reading_time_minutes: 25.0,
                sources: vec![Source {
                    title: "Artificial intelligence - Wikipedia".to_string(),
                    uri: "https://en.wikipedia.org/wiki/Artificial_intelligence".to_string(),
                }],
            },
        ),
        Task::completed(
            "demo-2",
            "https://www.nature.com/articles/d41586-023-03266-1",
            now_ms - 5_000_000,
            AnalysisResult {
                title: "Generative AI: The next frontier for science".to_string(),
                summary: "Generative artificial intelligence (AI) tools such as ChatGPT are \
                          rapidly transforming science. Researchers are using them to write code, \
                          summarize literature, and even generate new hypotheses. However, these \
                          tools also pose risks, such as hallucinating facts and perpetuating \
                          biases."
                    .to_string(),
                keywords: strings(&[
                    "Generative AI",
                    "Science",
                    "Research",
                    "ChatGPT",
                    "Large Language Models",
                ]),
                sentiment: Sentiment::Positive,
                main_entities: strings(&["Nature", "ChatGPT", "GPT-4"]),
                estimated_reading_time_minutes: 8.0,
                sources: vec![Source {
                    title: "Generative AI".to_string(),
                    uri: "https://www.nature.com/articles/d41586-023-03266-1".to_string(),
                }],
            },
        ),
    ]
    .into_iter()
    .collect()
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}
