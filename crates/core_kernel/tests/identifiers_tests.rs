//! Unit tests for the identifier types
//!
//! Covers UUID-backed ids, numeric collaborator ids, and natural-key codes.

use core_kernel::{
    AppointmentId, CampaignId, CenterId, CommentId, PartId, PartNumber, ReportId, StaffId,
    Vin, WarehouseId,
};
use uuid::Uuid;

mod uuid_ids {
    use super::*;

    #[test]
    fn test_new_generates_unique_ids() {
        assert_ne!(AppointmentId::new(), AppointmentId::new());
    }

    #[test]
    fn test_new_v7_generates_time_ordered_ids() {
        let id1 = ReportId::new_v7();
        std::thread::sleep(std::time::Duration::from_millis(1));
        let id2 = ReportId::new_v7();
        let uuid1: Uuid = id1.into();
        let uuid2: Uuid = id2.into();
        assert!(uuid1 < uuid2);
    }

    #[test]
    fn test_prefixes() {
        assert_eq!(AppointmentId::prefix(), "APT");
        assert_eq!(ReportId::prefix(), "RPT");
        assert_eq!(CommentId::prefix(), "CMT");
    }

    #[test]
    fn test_from_str_accepts_bare_uuid() {
        let uuid = Uuid::new_v4();
        let parsed: CommentId = uuid.to_string().parse().unwrap();
        assert_eq!(*parsed.as_uuid(), uuid);
    }

    #[test]
    fn test_from_str_rejects_garbage() {
        assert!("APT-not-a-uuid".parse::<AppointmentId>().is_err());
    }

    #[test]
    fn test_json_is_transparent() {
        let id = ReportId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.as_uuid()));
    }
}

mod numeric_ids {
    use super::*;

    #[test]
    fn test_round_trip_through_string() {
        let id = CampaignId::new(1042);
        assert_eq!(id.to_string().parse::<CampaignId>().unwrap(), id);
    }

    #[test]
    fn test_parse_rejects_negative() {
        assert!("-1".parse::<StaffId>().is_err());
    }

    #[test]
    fn test_ordering_follows_value() {
        let mut ids = vec![PartId::new(9), PartId::new(2), PartId::new(5)];
        ids.sort();
        assert_eq!(ids, vec![PartId::new(2), PartId::new(5), PartId::new(9)]);
    }

    #[test]
    fn test_json_is_a_number() {
        let json = serde_json::to_string(&CenterId::new(12)).unwrap();
        assert_eq!(json, "12");
        let back: WarehouseId = serde_json::from_str("12").unwrap();
        assert!(back.belongs_to(CenterId::new(12)));
    }
}

mod codes {
    use super::*;

    #[test]
    fn test_vin_is_uppercased() {
        assert_eq!(Vin::from("rlvf8abc123").to_string(), "RLVF8ABC123");
    }

    #[test]
    fn test_vin_equality_ignores_input_case() {
        assert_eq!(Vin::new("abc"), Vin::new("ABC "));
    }

    #[test]
    fn test_part_number_keeps_case() {
        assert_eq!(PartNumber::new("bat-01").as_str(), "bat-01");
    }

    #[test]
    fn test_json_round_trip() {
        let pn = PartNumber::new("MOTOR-7");
        let json = serde_json::to_string(&pn).unwrap();
        assert_eq!(json, "\"MOTOR-7\"");
        let back: PartNumber = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pn);
    }
}
