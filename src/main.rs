//! # Brickpage CLI
//!
//! Usage:
//!   brickpage input.json -o output.json
//!   echo '{ ... }' | brickpage -o output.json
//!   brickpage --example > job.json

use std::env;
use std::fs;
use std::io::{self, Read};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    // Handle --example flag
    if args.iter().any(|a| a == "--example") {
        print!("{}", example_job_json());
        return;
    }

    // Read input
    let input = if args.len() > 1 && !args[1].starts_with('-') {
        fs::read_to_string(&args[1]).expect("Failed to read input file")
    } else {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).expect("Failed to read stdin");
        buf
    };

    let output_path = args
        .windows(2)
        .find(|w| w[0] == "-o")
        .map(|w| w[1].clone());

    match brickpage::compose_json(&input) {
        Ok(composed) => match output_path {
            Some(path) => {
                fs::write(&path, &composed).expect("Failed to write output");
                eprintln!("✓ Written {} bytes to {}", composed.len(), path);
            }
            None => println!("{composed}"),
        },
        Err(e) => {
            eprintln!("✗ {e}");
            std::process::exit(1);
        }
    }
}

fn example_job_json() -> &'static str {
    r##"{
  "page": {
    "width": 816,
    "height": 1056,
    "margins": { "top": 24, "right": 24, "bottom": 24, "left": 24 }
  },
  "resolution": 96,
  "pages": [
    {
      "number": 1,
      "kind": "FrontCover",
      "attributes": [
        {
          "kind": "Title",
          "box": { "id": "cover.title", "width": 420, "height": 48 }
        },
        {
          "kind": "ModelName",
          "box": { "id": "cover.modelName", "width": 300, "height": 28 }
        },
        {
          "kind": "Author",
          "box": { "id": "cover.author", "width": 220, "height": 20 }
        }
      ]
    },
    {
      "number": 2,
      "kind": "Content",
      "header": { "id": "page2.header", "width": 768, "height": 28 },
      "pageNumber": { "id": "page2.number", "width": 24, "height": 18 },
      "content": {
        "type": "Step",
        "step": {
          "id": "step1",
          "stepNumber": { "id": "step1.num", "width": 28, "height": 22 },
          "csi": { "id": "step1.csi", "width": 420, "height": 340 },
          "pli": {
            "id": "step1.pli",
            "constraint": { "type": "Height", "max": 340 },
            "sort": [
              { "field": "Size", "direction": "Descending" }
            ],
            "parts": [
              {
                "partId": "3001",
                "colorId": "4",
                "instances": 2,
                "image": { "width": 76, "height": 60 },
                "instanceCount": { "width": 22, "height": 14 },
                "margins": { "top": 4, "right": 4, "bottom": 4, "left": 4 },
                "sort": { "size": 4560 }
              },
              {
                "partId": "3022",
                "colorId": "72",
                "image": { "width": 52, "height": 30 },
                "instanceCount": { "width": 16, "height": 14 },
                "margins": { "top": 4, "right": 4, "bottom": 4, "left": 4 },
                "sort": { "size": 1560 }
              }
            ]
          }
        }
      }
    },
    {
      "number": 3,
      "kind": "Content",
      "pageNumber": { "id": "page3.number", "width": 24, "height": 18 },
      "content": {
        "type": "StepGroup",
        "group": {
          "id": "group1",
          "direction": "Vertical",
          "instances": 2,
          "badge": { "id": "group1.badge", "width": 32, "height": 16 },
          "steps": [
            {
              "id": "step2",
              "stepNumber": { "id": "step2.num", "width": 28, "height": 22 },
              "csi": { "id": "step2.csi", "width": 260, "height": 200 }
            },
            {
              "id": "step3",
              "stepNumber": { "id": "step3.num", "width": 28, "height": 22 },
              "csi": { "id": "step3.csi", "width": 260, "height": 220 },
              "callouts": [
                {
                  "id": "step3.callout",
                  "instances": 3,
                  "badge": { "id": "step3.callout.badge", "width": 28, "height": 14 },
                  "steps": [
                    {
                      "id": "step3.callout.s1",
                      "csi": { "id": "step3.callout.s1.csi", "width": 120, "height": 90 }
                    }
                  ]
                }
              ]
            }
          ]
        }
      }
    }
  ]
}"##
}
