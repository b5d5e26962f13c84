use quiz_core::model::{Question, QuestionFormat, QuestionId};

// (prompt, answer, distractors, starting format)
const SEED: &[(&str, &str, [&str; 3], QuestionFormat)] = &[
    (
        "What is the powerhouse of the cell?",
        "Mitochondria",
        ["Nucleus", "Ribosome", "Golgi apparatus"],
        QuestionFormat::MultipleChoice,
    ),
    (
        "Which organelle contains the cell's genetic material?",
        "Nucleus",
        ["Lysosome", "Vacuole", "Cell wall"],
        QuestionFormat::MultipleChoice,
    ),
    (
        "Where are proteins synthesized in the cell?",
        "Ribosomes",
        ["Mitochondria", "Centrioles", "Peroxisomes"],
        QuestionFormat::MultipleChoice,
    ),
    (
        "What process converts light energy into chemical energy in plants?",
        "Photosynthesis",
        ["Respiration", "Fermentation", "Transpiration"],
        QuestionFormat::Written,
    ),
    (
        "What molecule carries energy within cells?",
        "ATP",
        ["DNA", "Glucose", "Chlorophyll"],
        QuestionFormat::MultipleChoice,
    ),
    (
        "Which structure controls what enters and leaves the cell?",
        "Cell membrane",
        ["Cytoplasm", "Nucleolus", "Endoplasmic reticulum"],
        QuestionFormat::MultipleChoice,
    ),
    (
        "What type of cell division produces gametes?",
        "Meiosis",
        ["Mitosis", "Binary fission", "Budding"],
        QuestionFormat::Written,
    ),
    (
        "Which pigment makes plants green?",
        "Chlorophyll",
        ["Carotene", "Melanin", "Hemoglobin"],
        QuestionFormat::MultipleChoice,
    ),
    (
        "What is the basic unit of heredity?",
        "Gene",
        ["Chromosome", "Allele frequency", "Protein"],
        QuestionFormat::MultipleChoice,
    ),
    (
        "Which organelle packages and ships proteins?",
        "Golgi apparatus",
        ["Ribosome", "Nucleus", "Vacuole"],
        QuestionFormat::MultipleChoice,
    ),
    (
        "What is the process by which water moves across a semipermeable membrane?",
        "Osmosis",
        ["Diffusion", "Active transport", "Endocytosis"],
        QuestionFormat::Written,
    ),
    (
        "Which molecule stores genetic instructions in most organisms?",
        "DNA",
        ["RNA", "ATP", "Lipids"],
        QuestionFormat::MultipleChoice,
    ),
];

/// The embedded question bank.
pub(crate) fn seed_questions() -> Vec<Question> {
    SEED.iter()
        .zip(1_u64..)
        .filter_map(|(&(prompt, answer, distractors, format), id)| {
            // Rotate the answer through the option slots so it is not always first.
            let mut options: Vec<String> = distractors.iter().map(|d| (*d).to_owned()).collect();
            let slot = usize::try_from(id).unwrap_or(0) % (options.len() + 1);
            options.insert(slot, answer.to_owned());
            Question::new(QuestionId::new(id), prompt, answer, options)
                .ok()
                .map(|q| q.with_format(format))
        })
        .collect()
}
