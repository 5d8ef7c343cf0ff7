//! Prompt templates for the sentiment and summarization chains.

use rm_core::Sentiment;
use serde::Deserialize;

/// One labeled example steering the sentiment classifier.
#[derive(Debug, Clone, Deserialize)]
pub struct FewShotExample {
    pub question: String,
    pub answer: String,
}

/// Classification prompt. With examples present this becomes a few-shot
/// prompt; the final instruction is identical either way and names the four
/// admissible labels.
pub fn sentiment_prompt(content: &str, topic: &str, examples: &[FewShotExample]) -> String {
    let mut prompt = String::new();
    for example in examples {
        prompt.push_str(&format!("Question: {}\n{}\n\n", example.question, example.answer));
    }
    prompt.push_str(&format!(
        "This is the news article {content} related to {topic}. \
         Strictly restrict and clearly focus on content related to {topic}. \
         Return either Positive or Negative or Neutral according to the content \
         sentiment towards the {topic}. If the content is not related to the \
         {topic} at all then return Not-related"
    ));
    prompt
}

/// 50-word single-article summary; instructs the model to answer with the
/// Not-related sentinel for off-topic content.
pub fn summary_prompt(content: &str, topic: &str) -> String {
    format!(
        "This is the news article content {content}. \
         Strictly restrict and Summarize the content of this news article in 50 words \
         such that whole important content related to the {topic} is covered within these 50 words. \
         Strictly restrict to this content only. Please avoid anything that is not related to this content. \
         If the content is not related to the {topic}, just return Not-related content."
    )
}

/// Up-to-three-bullet condensation of a batch of joined summaries, phrased
/// for the given polarity toward the topic.
pub fn bullet_prompt(contents: &str, topic: &str, polarity: Sentiment) -> String {
    let (tone, direction) = match polarity {
        Sentiment::Negative => ("negative", "decrease"),
        _ => ("positive", "increase"),
    };
    format!(
        "These are the news articles {contents} related to the topic {topic} and are {tone} \
         towards the {topic}. Strictly restrict the knowledge to this content only and select \
         only unique {tone} crucial information from all these articles that could {direction} \
         the reputation of {topic} in public and return 3 unique important detailed bullet \
         points that has most important information, if you could not get 3 bullet points, \
         no problem pull as many as you can"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentiment_prompt_includes_few_shots_before_instruction() {
        let examples = vec![FewShotExample {
            question: "Acme profits soared".to_string(),
            answer: "Positive".to_string(),
        }];
        let prompt = sentiment_prompt("some content", "Acme Corp", &examples);
        let question_pos = prompt.find("Acme profits soared").unwrap();
        let instruction_pos = prompt.find("Return either Positive").unwrap();
        assert!(question_pos < instruction_pos);
        assert!(prompt.contains("return Not-related"));
    }

    #[test]
    fn summary_prompt_carries_the_sentinel_instruction() {
        let prompt = summary_prompt("some content", "Acme Corp");
        assert!(prompt.contains("in 50 words"));
        assert!(prompt.contains("just return Not-related content."));
    }

    #[test]
    fn bullet_prompt_matches_polarity() {
        let positive = bullet_prompt("a----b", "Acme Corp", Sentiment::Positive);
        assert!(positive.contains("could increase the reputation"));
        let negative = bullet_prompt("a----b", "Acme Corp", Sentiment::Negative);
        assert!(negative.contains("could decrease the reputation"));
        assert!(negative.contains("unique negative crucial information"));
    }
}
