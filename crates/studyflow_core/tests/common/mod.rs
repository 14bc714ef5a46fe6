#![allow(dead_code)]

use serde_json::{json, Value};
use studyflow_core::model::study::Study;

/// Two-module study: a daily survey with two sections and a weekly PVT.
pub fn sample_study_json() -> Value {
    json!({
        "_type": "study",
        "properties": {
            "_type": "properties",
            "study_id": "Sleep-Pilot",
            "study_name": "Sleep pilot",
            "instructions": "Thanks for joining.",
            "banner_url": "",
            "support_email": "team@example.org",
            "support_url": "",
            "ethics": "",
            "pls": "",
            "created_by": "",
            "empty_msg": "Nothing to do today.",
            "post_url": "",
            "conditions": ["Control", "Treatment"],
            "cache": false
        },
        "modules": [
            {
                "_type": "module",
                "id": "Morning-Diary",
                "name": "Morning diary",
                "condition": "*",
                "alerts": {
                    "scheduleMode": "absolute",
                    "startDateTime": "2025-01-06T08:00",
                    "until": "2025-01-08",
                    "title": "Morning diary",
                    "message": "How did you sleep?",
                    "times": ["12:30"],
                    "repeat": "daily",
                    "interval": 1,
                    "random": true,
                    "randomInterval": 15,
                    "sticky": false,
                    "stickyLabel": "",
                    "timeout": false,
                    "timeoutAfter": 0
                },
                "graph": {"display": false},
                "unlock_after": [],
                "params": {
                    "_type": "params",
                    "type": "survey",
                    "id": "diary_params",
                    "submit_text": "Done",
                    "shuffle": false,
                    "sections": [
                        {
                            "_type": "section",
                            "id": "sleep",
                            "name": "Sleep",
                            "shuffle": false,
                            "questions": [
                                {
                                    "_type": "question",
                                    "id": "Hours",
                                    "type": "slider",
                                    "text": "How many hours did you sleep?",
                                    "required": true,
                                    "rand_group": "",
                                    "min": 0,
                                    "max": 12,
                                    "hint_left": "none",
                                    "hint_right": "12h"
                                },
                                {
                                    "_type": "question",
                                    "id": "rested",
                                    "type": "yesno",
                                    "text": "Do you feel rested?",
                                    "required": false,
                                    "rand_group": "",
                                    "yes_text": "Yes",
                                    "no_text": "No",
                                    "hide_id": "hours",
                                    "hide_value": "0",
                                    "hide_if": true
                                }
                            ]
                        },
                        {
                            "_type": "section",
                            "id": "mood",
                            "name": "Mood",
                            "shuffle": true,
                            "questions": [
                                {
                                    "_type": "question",
                                    "id": "mood_now",
                                    "type": "multi",
                                    "text": "Pick your mood",
                                    "required": true,
                                    "rand_group": "",
                                    "radio": true,
                                    "modal": false,
                                    "options": ["Good", "Okay", "Bad"],
                                    "shuffle": false
                                },
                                {
                                    "_type": "question",
                                    "id": "thanks",
                                    "type": "instruction",
                                    "text": "Thank you!",
                                    "required": false,
                                    "rand_group": ""
                                }
                            ]
                        }
                    ]
                }
            },
            {
                "_type": "module",
                "id": "reaction",
                "name": "Reaction time",
                "condition": "Treatment",
                "alerts": {
                    "scheduleMode": "relative",
                    "expectedEnrollmentDate": "2025-01-03",
                    "offsetDays": 2,
                    "offsetTime": "19:00",
                    "repeat": "weekly",
                    "interval": 1,
                    "repeatCount": 1,
                    "title": "Reaction task",
                    "message": "Time for the reaction task."
                },
                "graph": {"display": true, "variable": "rt", "title": "RT", "blurb": "", "type": "line", "max_points": 10},
                "unlock_after": ["morningdiary"],
                "params": {
                    "_type": "params",
                    "type": "pvt",
                    "id": "reaction_pvt",
                    "trials": 20,
                    "min_waiting": 1000,
                    "max_waiting": 4000,
                    "max_reaction": 2000,
                    "show": true,
                    "exit": true
                }
            }
        ]
    })
}

pub fn sample_study() -> Study {
    serde_json::from_value(sample_study_json()).unwrap()
}
