use super::{Question, QuestionCatalog, QuestionKind, RuleSpec};

/// Ten-question learner feedback survey. Nine required single-selects
/// followed by one optional free-text question.
pub fn feedback_catalog() -> QuestionCatalog {
    let questions = vec![
        Question::select(
            "overallSatisfaction",
            "1. Overall Learning Experience",
            ["Very satisfied", "Satisfied", "Neutral", "Unsatisfied"],
        )
        .with_subtitle("How satisfied are you with the overall learning experience?")
        .required(),
        Question::select(
            "lessonClarity",
            "2. Lesson Clarity",
            ["Clear", "Sometimes confusing", "Confusing"],
        )
        .with_subtitle("How clear were the lessons taught in class?")
        .required(),
        Question::select(
            "comfortAskingQuestions",
            "3. Comfort Asking Questions",
            ["Very comfortable", "Comfortable", "Not comfortable at all"],
        )
        .with_subtitle("How comfortable do you feel asking questions in class?")
        .required(),
        Question::select(
            "trainerSpeed",
            "4. Trainer Teaching Speed",
            ["Too fast", "Perfect speed", "Too slow"],
        )
        .with_subtitle("Do you feel the trainer explains concepts at the right speed?")
        .required(),
        Question::select(
            "practicalSessionsHelpful",
            "5. Practical Sessions Usefulness",
            ["Very helpful", "Somewhat helpful", "Not helpful"],
        )
        .with_subtitle("Are the practical sessions helpful in improving your skills?")
        .required(),
        Question::select(
            "adminCommunication",
            "6. Admin Communication",
            ["Yes", "Sometimes", "No"],
        )
        .with_subtitle("Do you feel the admin staff communicates updates clearly?")
        .required(),
        Question::select(
            "trainerApproachability",
            "7. Trainer Approachability",
            ["Very approachable", "Approachable", "Not approachable"],
        )
        .with_subtitle("How approachable is the trainer?")
        .required(),
        Question::select(
            "classroomFacilities",
            "8. Classroom Facilities",
            ["Very satisfied", "Satisfied", "Not satisfied"],
        )
        .with_subtitle("Are you satisfied with classroom facilities?")
        .required(),
        Question::select(
            "recommendAcademy",
            "9. Recommendation",
            ["Yes", "Maybe", "No"],
        )
        .with_subtitle("Would you recommend Delta Digital Academy to others?")
        .required(),
        Question::new(
            "additionalFeedback",
            QuestionKind::MultiLineText,
            "10. Additional Feedback",
        )
        .with_subtitle("Any suggestions about academy, classes, or trainers?")
        .with_placeholder("Write your feedback here..."),
    ];
    QuestionCatalog::new(questions).expect("built-in feedback catalog is well formed")
}

/// Applicant form with the length and format constraints of the enrollment
/// schema.
pub fn application_catalog() -> QuestionCatalog {
    let questions = vec![
        Question::new("fullName", QuestionKind::ShortText, "Full Name")
            .required()
            .with_required_message("Full name must be at least 2 characters")
            .with_rule(min_length(2, "Full name must be at least 2 characters"))
            .with_rule(max_length(100, "Full name must be less than 100 characters")),
        Question::new("email", QuestionKind::Email, "Email Address")
            .required()
            .with_required_message("Email is required")
            .with_placeholder("name@example.com"),
        Question::new("phone", QuestionKind::Phone, "Phone Number")
            .required()
            .with_submission_key("PhoneNumber")
            .with_required_message("Phone number must be at least 8 characters")
            .with_rule(min_length(8, "Phone number must be at least 8 characters"))
            .with_rule(max_length(20, "Phone number must be less than 20 characters")),
        Question::new("dateOfBirth", QuestionKind::Date, "Date of Birth")
            .required()
            .with_submission_key("Dob")
            .with_required_message("Date of birth is required")
            .with_placeholder("YYYY-MM-DD"),
        Question::new(
            "highestQualification",
            QuestionKind::ShortText,
            "Highest Qualification",
        )
        .required()
        .with_rule(min_length(
            2,
            "Highest qualification must be at least 2 characters",
        ))
        .with_rule(max_length(
            50,
            "Highest qualification must be less than 50 characters",
        )),
        Question::new("institutionName", QuestionKind::ShortText, "Institution Name")
            .required()
            .with_rule(min_length(2, "Institution name must be at least 2 characters"))
            .with_rule(max_length(50, "Institution name must be less than 50 characters")),
        Question::new("fieldOfStudy", QuestionKind::ShortText, "Field of Study")
            .required()
            .with_rule(min_length(2, "Field of study must be at least 2 characters"))
            .with_rule(max_length(50, "Field of study must be less than 50 characters")),
        Question::select(
            "courseInterest",
            "Which course are you interested in at Delta Digital Academy?",
            ["Digital Marketing", "Data Science", "Web Development", "Other"],
        )
        .required()
        .with_submission_key("CourseIntrest")
        .with_required_message("Please select your course interest"),
        Question::select(
            "howDidYouHearAboutUs",
            "How did you hear about Delta Digital Academy?",
            ["Social media", "Friend or family", "Search engine", "Event", "Other"],
        )
        .required()
        .with_required_message("Please select how you heard about us"),
    ];
    QuestionCatalog::new(questions).expect("built-in application catalog is well formed")
}

fn min_length(value: usize, message: &str) -> RuleSpec {
    RuleSpec::MinLength {
        value,
        message: Some(message.to_string()),
    }
}

fn max_length(value: usize, message: &str) -> RuleSpec {
    RuleSpec::MaxLength {
        value,
        message: Some(message.to_string()),
    }
}
