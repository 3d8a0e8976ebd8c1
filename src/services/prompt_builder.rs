use crate::models::travel_plan::TravelPlanRequest;

/// Literal example object embedded in every prompt. The model is told to
/// answer with exactly this shape and nothing else.
const SCHEMA_EXAMPLE: &str = r#"{
  "overview": "旅游计划概述",
  "daily_plans": [
    {
      "day": 1,
      "description": "第一天概述",
      "poi_list": [
        {
          "name": "景点名称",
          "address": "景点地址",
          "latitude": 39.123456,
          "longitude": 116.123456,
          "description": "景点描述",
          "recommended_duration": "2小时"
        }
      ]
    }
  ]
}"#;

/// Render the instruction text for a trip. Deterministic over the request and
/// the (already validated) day count; performs no I/O.
pub fn build_prompt(request: &TravelPlanRequest, travel_days: u32) -> String {
    let mode = request.travel_mode.as_str();

    let mut prompt = String::from("请为我生成一份详细的旅游计划，遵循以下要求：\n\n");

    if let Some(city) = &request.city {
        prompt.push_str(&format!("城市: {}\n", city));
    }
    prompt.push_str(&format!("中心位置: {}\n", describe_center(request)));
    prompt.push_str(&format!("旅行天数: {}天\n", travel_days));
    prompt.push_str(&format!("出行方式: {}\n", mode));
    if !request.preferences.is_empty() {
        prompt.push_str(&format!("偏好: {}\n", request.preferences.join("、")));
    }

    if !request.scenic_spots.is_empty() {
        prompt.push_str("用户已选择的景点:\n");
        for (i, spot) in request.scenic_spots.iter().enumerate() {
            prompt.push_str(&format!(
                "{}. {}, 地址: {}, 坐标: ({}, {})\n",
                i + 1,
                spot.name,
                spot.address,
                spot.latitude,
                spot.longitude
            ));
        }
    }

    prompt.push_str(&format!(
        "\n请根据以下要求制定一个合理的旅游行程:\n\
         1. 以中心位置为基础，规划{days}天的行程\n\
         2. 考虑到用户的出行方式是{mode}，规划合理的游览路线\n\
         3. 每天安排2-4个景点，考虑景点之间的距离和游览时间\n\
         4. 若用户已选择景点，请确保将这些景点合理地融入到行程中\n\n\
         你必须严格按照下面的JSON格式返回完整的旅游计划，不要添加任何额外的解释文本：\n\n",
        days = travel_days,
        mode = mode
    ));

    prompt.push_str(SCHEMA_EXAMPLE);
    prompt.push_str(
        "\n\n请确保：\n\
         1. 返回的是纯JSON格式，不包含```json标记或任何说明文字\n\
         2. 所有JSON语法必须准确无误（如引号、逗号等）\n\
         3. 坐标信息尽量准确\n\
         4. 只返回这个JSON对象，不要有任何其他内容\n",
    );

    prompt
}

fn describe_center(request: &TravelPlanRequest) -> String {
    let center = &request.center_location;
    if let Some(name) = &center.name {
        return name.clone();
    }
    if let Some(address) = &center.address {
        return address.clone();
    }
    format!("({}, {})", center.latitude, center.longitude)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::travel_plan::{LocationRequest, ScenicSpot, TravelMode, TripDuration};

    fn beijing_request() -> TravelPlanRequest {
        TravelPlanRequest {
            city: Some("Beijing".to_string()),
            center_location: LocationRequest {
                latitude: 39.9087,
                longitude: 116.3975,
                name: Some("天安门".to_string()),
                address: None,
            },
            duration: TripDuration::Days { travel_days: 3 },
            scenic_spots: vec![],
            preferences: vec![],
            travel_mode: TravelMode::Walking,
        }
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let request = beijing_request();
        assert_eq!(build_prompt(&request, 3), build_prompt(&request, 3));
    }

    #[test]
    fn test_prompt_mentions_days_mode_and_center() {
        let prompt = build_prompt(&beijing_request(), 3);
        assert!(prompt.contains("3天"));
        assert!(prompt.contains("walking"));
        assert!(prompt.contains("天安门"));
        assert!(prompt.contains("Beijing"));
    }

    #[test]
    fn test_empty_spot_list_omits_section() {
        let prompt = build_prompt(&beijing_request(), 3);
        assert!(!prompt.contains("用户已选择的景点"));
    }

    #[test]
    fn test_selected_spots_are_enumerated_in_order() {
        let mut request = beijing_request();
        request.scenic_spots = vec![
            ScenicSpot {
                name: "故宫".to_string(),
                address: "北京市东城区景山前街4号".to_string(),
                latitude: 39.9163,
                longitude: 116.3972,
            },
            ScenicSpot {
                name: "颐和园".to_string(),
                address: "北京市海淀区新建宫门路19号".to_string(),
                latitude: 39.9999,
                longitude: 116.2755,
            },
        ];

        let prompt = build_prompt(&request, 3);
        assert!(prompt.contains("用户已选择的景点:\n"));
        assert!(prompt
            .contains("1. 故宫, 地址: 北京市东城区景山前街4号, 坐标: (39.9163, 116.3972)"));
        assert!(prompt
            .contains("2. 颐和园, 地址: 北京市海淀区新建宫门路19号, 坐标: (39.9999, 116.2755)"));
    }

    #[test]
    fn test_schema_example_embedded() {
        let prompt = build_prompt(&beijing_request(), 3);
        assert!(prompt.contains("\"daily_plans\""));
        assert!(prompt.contains("\"recommended_duration\""));
    }

    #[test]
    fn test_preferences_listed_when_present() {
        let mut request = beijing_request();
        request.preferences = vec!["历史".to_string(), "美食".to_string()];
        let prompt = build_prompt(&request, 3);
        assert!(prompt.contains("偏好: 历史、美食"));

        let bare = build_prompt(&beijing_request(), 3);
        assert!(!bare.contains("偏好"));
    }

    #[test]
    fn test_coordinates_used_when_center_unnamed() {
        let mut request = beijing_request();
        request.center_location.name = None;
        let prompt = build_prompt(&request, 3);
        assert!(prompt.contains("中心位置: (39.9087, 116.3975)"));
    }
}
