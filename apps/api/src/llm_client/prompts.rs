// Prompt text shared by every completion call.
// The CV template markers are substituted by `cv::prompt::build_prompt`.

/// System message sent with every completion.
pub const RECRUITER_SYSTEM: &str =
    "you are a technical recruiter with expertise in software development roles.";

/// Built-in CV prompt, used when no template file is configured.
/// Markers: `{{jobDescription}}`, `{{userProfile}}`.
pub const DEFAULT_CV_TEMPLATE: &str = r#"Tailor the candidate profile below to the job description and return the CV as ONE JSON object.

Keep only facts present in the profile. Reorder and rephrase to match the role; drop entries that are irrelevant.
Put the most relevant skills first. Dates stay in "YYYY-MM" form exactly as the profile has them.

Schema (omit any field you have no data for):
{
  "fullName": "string",
  "title": "string, headline aimed at the role",
  "email": "string",
  "phone": "string",
  "location": "string",
  "summary": "string, 3-4 sentences",
  "skills": ["string"],
  "links": [{"type": "GitHub", "url": "https://..."}],
  "experiences": [{
    "jobTitle": "string", "companyName": "string", "employmentType": "string",
    "location": "string", "startDate": "YYYY-MM", "endDate": "YYYY-MM",
    "currentlyWorking": false, "description": "- bullet\n- bullet",
    "links": [{"type": "string", "url": "string"}]
  }],
  "projects": [{
    "title": "string", "description": "string", "technologies": ["string"],
    "links": [{"type": "string", "url": "string"}],
    "startDate": "YYYY-MM", "endDate": "YYYY-MM", "currentlyOngoing": false
  }],
  "education": [{
    "schoolName": "string", "degree": "string", "fieldOfStudy": "string", "grade": "string",
    "location": "string", "startDate": "YYYY-MM", "endDate": "YYYY-MM",
    "currentlyStudying": false, "description": "string"
  }],
  "activities": [{
    "title": "string", "role": "string", "startDate": "YYYY-MM", "endDate": "YYYY-MM",
    "currentlyOngoing": false, "description": "string"
  }],
  "volunteering": [{
    "organizationName": "string", "role": "string", "location": "string",
    "startDate": "YYYY-MM", "endDate": "YYYY-MM", "currentlyVolunteering": false,
    "description": "string"
  }],
  "certificates": [{
    "name": "string", "issuer": "string", "startDate": "YYYY-MM", "url": "string",
    "description": "string"
  }]
}

Respond with the JSON object only. No markdown, no commentary.

JOB DESCRIPTION:
{{jobDescription}}

CANDIDATE PROFILE (JSON):
{{userProfile}}
"#;
