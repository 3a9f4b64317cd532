/// Phrase the model is told to use when the context does not hold the answer.
pub const CANNOT_FIND_ANSWER: &str =
    "I cannot find the answer to the question in the provided PDF document";

pub const ANSWER_MARKER: &str = "Answer:";

pub fn qa_prompt(context: &str, question: &str) -> String {
    // The contract:
    // - Use ONLY the PDF content provided.
    // - Decline with CANNOT_FIND_ANSWER instead of guessing.
    // - The prompt ends with ANSWER_MARKER; everything after it is the answer.
    format!(
        r#"I am an AI assistant tasked with answering questions based on the provided PDF content.
Please analyze the following excerpt from the PDF and answer the question.

PDF content:
{context}

Question: {question}

Instructions:
- Respond only based on the information provided in the PDF content above.
- If the answer cannot be found in the provided content, say "{CANNOT_FIND_ANSWER}".
- Be concise and specific.
- Include relevant quotes or references from the PDF when applicable.

{ANSWER_MARKER}"#,
        context = context.trim_end(),
        question = question.trim(),
    )
}
