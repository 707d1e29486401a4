//! Count summaries over loaded record sets.
//!
//! Every function here is pure: callers load the rows and pass the reference
//! date, so the same input always yields the same summary. Categorical values
//! that match none of the known labels land in an explicit "other" bucket.

use chrono::{Datelike, Duration, NaiveDate};
use std::collections::{BTreeMap, HashMap};

use shared::{
    AttendanceRate, Attendance, BeltDistribution, ChildPresentation, Graduation, JiuJitsuAgeGroups,
    JiuJitsuPaymentStats, JiuJitsuStats, JiuJitsuStudent, Member, MemberStats,
    MensGroupMember, MensGroupStats, MusicSchoolStats, MusicSchoolStudent, Payment,
    PresentationStats, GENDER_FEMALE, GENDER_MALE, PAYMENT_STATUS_DEFAULTED, PAYMENT_STATUS_LATE,
    PAYMENT_STATUS_UP_TO_DATE,
};

pub const OTHER_BUCKET: &str = "Outros";

const MEMBERSHIP_TYPES: [&str; 6] = [
    "Visitante",
    "Congregado",
    "Membro",
    "Diácono",
    "Presbítero",
    "Pastor",
];
const MEMBER_GENDERS: [&str; 3] = [GENDER_MALE, GENDER_FEMALE, "Não informado"];
const MARITAL_STATUSES: [&str; 4] = ["Solteiro(a)", "Casado(a)", "Divorciado(a)", "Viúvo(a)"];
const BAPTISM_STATUSES: [&str; 4] = [
    "Não batizado",
    "Batizado nas águas",
    "Batizado no Espírito Santo",
    "Ambos",
];

/// Whole years between `birth` and `today`; `None` for dates in the future
pub fn age_in_years(birth: NaiveDate, today: NaiveDate) -> Option<u32> {
    if birth > today {
        return None;
    }
    let mut years = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}

/// Summary of child presentations.
///
/// Age brackets use days since birth: under 365, under 1095, under 2190 and
/// the rest. A birth date after `today` counts as under one year.
pub fn presentation_stats(records: &[ChildPresentation], today: NaiveDate) -> PresentationStats {
    let mut stats = PresentationStats::default();

    for record in records {
        stats.total_presentations += 1;

        let date = record.presentation_date;
        if date.year() == today.year() {
            stats.presentations_this_year += 1;
            if date.month() == today.month() {
                stats.presentations_this_month += 1;
            }
        }

        match record.gender.as_str() {
            GENDER_MALE => stats.gender_stats.boys += 1,
            GENDER_FEMALE => stats.gender_stats.girls += 1,
            _ => stats.gender_stats.other += 1,
        }

        match record.birth_date {
            Some(birth) => {
                let days = (today - birth).num_days();
                let bucket = if days < 365 {
                    &mut stats.age_stats.under1_year
                } else if days < 1095 {
                    &mut stats.age_stats.age1_to2
                } else if days < 2190 {
                    &mut stats.age_stats.age3_to5
                } else {
                    &mut stats.age_stats.over5_years
                };
                *bucket += 1;
            }
            None => stats.age_stats.unknown += 1,
        }

        if let Some(bucket) = stats.monthly_stats.bucket_mut(date.month()) {
            *bucket += 1;
        }

        if record.certificate_generated {
            stats.certificates_generated += 1;
        } else {
            stats.pending_certificates += 1;
        }
    }

    stats
}

/// Summary of members. Counts cover every member; distributions cover the
/// active ones. `family_sizes` maps member id to number of family rows.
pub fn member_stats(
    members: &[Member],
    family_sizes: &HashMap<i64, u32>,
    today: NaiveDate,
) -> MemberStats {
    let mut stats = MemberStats {
        total_members: members.len() as u32,
        membership_types: labelled_buckets(&MEMBERSHIP_TYPES),
        gender_distribution: labelled_buckets(&MEMBER_GENDERS),
        marital_status: labelled_buckets(&MARITAL_STATUSES),
        baptism_status: labelled_buckets(&BAPTISM_STATUSES),
        ..Default::default()
    };

    for member in members {
        if !member.is_active {
            stats.inactive_members += 1;
            continue;
        }
        stats.active_members += 1;

        count_labelled(&mut stats.membership_types, &member.membership_type);
        count_labelled(&mut stats.gender_distribution, &member.gender);
        count_labelled(&mut stats.marital_status, &member.marital_status);
        count_labelled(&mut stats.baptism_status, &member.baptism_status);

        let age = member.birth_date.and_then(|birth| age_in_years(birth, today));
        let groups = &mut stats.age_groups;
        match age {
            Some(0..=12) => groups.children += 1,
            Some(13..=17) => groups.teens += 1,
            Some(18..=29) => groups.young_adults += 1,
            Some(30..=59) => groups.adults += 1,
            Some(_) => groups.seniors += 1,
            None => groups.unknown += 1,
        }

        let family = family_sizes.get(&member.id).copied().unwrap_or(0);
        if family > 0 {
            stats.members_with_family += 1;
            stats.total_family_members += family;
        }
    }

    stats
}

/// Summary of music school students; breakdowns and revenue cover active students
pub fn music_school_stats(students: &[MusicSchoolStudent]) -> MusicSchoolStats {
    let mut stats = MusicSchoolStats {
        total_students: students.len() as u32,
        ..Default::default()
    };

    for student in students {
        if !student.is_active {
            stats.inactive_students += 1;
            continue;
        }
        stats.active_students += 1;

        *stats
            .students_by_instrument
            .entry(student.instrument.clone())
            .or_default() += 1;
        *stats.students_by_level.entry(student.level.clone()).or_default() += 1;
        *stats
            .students_by_payment_status
            .entry(student.payment_status.clone())
            .or_default() += 1;

        stats.total_monthly_revenue += student.monthly_fee;
        if student.payment_status != PAYMENT_STATUS_UP_TO_DATE {
            stats.students_with_pending_payment += 1;
        }
    }

    stats
}

/// Summary of the jiu-jitsu academy.
///
/// Payments received cover the reference month of `today`. Attendance rates
/// are percentages of present marks, rounded to two decimals.
pub fn jiu_jitsu_stats(
    students: &[JiuJitsuStudent],
    graduations: &[Graduation],
    attendances: &[Attendance],
    payments: &[Payment],
    today: NaiveDate,
) -> JiuJitsuStats {
    let mut stats = JiuJitsuStats {
        total_students: students.len() as u32,
        ..Default::default()
    };

    for student in students {
        if !student.is_active {
            stats.inactive_students += 1;
            continue;
        }
        stats.active_students += 1;
        count_belt(&mut stats.belt_distribution, &student.belt);
        count_payment_status(&mut stats.payment_stats, student);
        count_jiu_jitsu_age(&mut stats.age_groups, student.birth_date, today);
        stats.total_monthly_revenue += student.monthly_fee;
    }

    let current_month = reference_month(today);
    stats.payment_stats.total_received = payments
        .iter()
        .filter(|p| p.reference_month == current_month)
        .map(|p| p.amount)
        .sum();

    stats.total_graduations_this_year = graduations
        .iter()
        .filter(|g| g.graduation_date.year() == today.year())
        .count() as u32;

    stats.attendance_rate = AttendanceRate {
        overall_rate: attendance_rate(attendances.iter()),
        last_week_rate: attendance_rate(
            attendances
                .iter()
                .filter(|a| a.date > today - Duration::days(7) && a.date <= today),
        ),
        last_month_rate: attendance_rate(
            attendances
                .iter()
                .filter(|a| a.date > today - Duration::days(30) && a.date <= today),
        ),
    };

    stats
}

/// Summary of the men's group; role breakdown covers active members
pub fn mens_group_stats(members: &[MensGroupMember], today: NaiveDate) -> MensGroupStats {
    let mut stats = MensGroupStats {
        total_members: members.len() as u32,
        ..Default::default()
    };

    for member in members {
        if member.join_date.year() == today.year() {
            stats.joined_this_year += 1;
        }
        if !member.is_active {
            stats.inactive_members += 1;
            continue;
        }
        stats.active_members += 1;
        let role = member
            .role
            .as_deref()
            .filter(|r| !r.trim().is_empty())
            .unwrap_or(OTHER_BUCKET);
        *stats.roles.entry(role.to_string()).or_default() += 1;
    }

    stats
}

/// `YYYY-MM` label used by jiu-jitsu payments
pub fn reference_month(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

fn labelled_buckets(labels: &[&str]) -> BTreeMap<String, u32> {
    labels
        .iter()
        .map(|label| (label.to_string(), 0))
        .chain(std::iter::once((OTHER_BUCKET.to_string(), 0)))
        .collect()
}

/// Increments the matching label, falling back to the "other" bucket
fn count_labelled(buckets: &mut BTreeMap<String, u32>, value: &str) {
    let key = if buckets.contains_key(value) && value != OTHER_BUCKET {
        value
    } else {
        OTHER_BUCKET
    };
    if let Some(count) = buckets.get_mut(key) {
        *count += 1;
    }
}

fn count_belt(distribution: &mut BeltDistribution, belt: &str) {
    match belt {
        "Branca" => distribution.branca += 1,
        "Azul" => distribution.azul += 1,
        "Roxa" => distribution.roxa += 1,
        "Marrom" => distribution.marrom += 1,
        "Preta" => distribution.preta += 1,
        _ => distribution.other += 1,
    }
}

fn count_payment_status(payments: &mut JiuJitsuPaymentStats, student: &JiuJitsuStudent) {
    match student.payment_status.as_str() {
        PAYMENT_STATUS_UP_TO_DATE => payments.em_dia += 1,
        PAYMENT_STATUS_LATE => payments.atrasado += 1,
        PAYMENT_STATUS_DEFAULTED => payments.inadimplente += 1,
        _ => {}
    }
    if student.payment_status != PAYMENT_STATUS_UP_TO_DATE {
        payments.total_pending += student.monthly_fee;
    }
}

fn count_jiu_jitsu_age(groups: &mut JiuJitsuAgeGroups, birth: Option<NaiveDate>, today: NaiveDate) {
    match birth.and_then(|b| age_in_years(b, today)) {
        Some(0..=12) => groups.kids += 1,
        Some(13..=17) => groups.teens += 1,
        Some(18..=39) => groups.adults += 1,
        Some(_) => groups.seniors += 1,
        None => groups.unknown += 1,
    }
}

fn attendance_rate<'a>(records: impl Iterator<Item = &'a Attendance>) -> f64 {
    let (present, total) = records.fold((0u32, 0u32), |(present, total), a| {
        (present + u32::from(a.is_present), total + 1)
    });
    if total == 0 {
        return 0.0;
    }
    let rate = f64::from(present) * 100.0 / f64::from(total);
    (rate * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn presentation(gender: &str, birth: Option<NaiveDate>, on: NaiveDate) -> ChildPresentation {
        ChildPresentation {
            id: 1,
            child_name: "Ana".to_string(),
            birth_date: birth,
            gender: gender.to_string(),
            birth_place: None,
            father_name: "José".to_string(),
            father_profession: None,
            mother_name: "Maria".to_string(),
            mother_profession: None,
            presentation_date: on,
            pastor: "Pedro".to_string(),
            biblical_verse: None,
            special_message: None,
            address: None,
            city: None,
            phone: None,
            email: None,
            church_name: "Igreja".to_string(),
            church_address: None,
            certificate_generated: false,
            certificate_path: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            notes: None,
            is_active: true,
        }
    }

    fn member(id: i64, active: bool, gender: &str, birth: Option<NaiveDate>) -> Member {
        Member {
            id,
            full_name: format!("Membro {}", id),
            cpf: None,
            rg: None,
            birth_date: birth,
            gender: gender.to_string(),
            marital_status: "Casado(a)".to_string(),
            profession: None,
            education: None,
            photo_path: None,
            email: format!("m{}@igreja.com", id),
            phone: "1199999".to_string(),
            alternative_phone: None,
            address: None,
            neighborhood: None,
            city: None,
            state: None,
            zip_code: None,
            membership_date: date(2020, 1, 1),
            membership_type: "Membro".to_string(),
            baptism_status: "Ambos".to_string(),
            baptism_date: None,
            baptism_location: None,
            previous_church: None,
            ministry: None,
            cell_group: None,
            leadership_position: None,
            emergency_contact_name: None,
            emergency_contact_phone: None,
            emergency_contact_relationship: None,
            notes: None,
            is_active: active,
        }
    }

    fn attendance(date: NaiveDate, is_present: bool) -> Attendance {
        Attendance {
            id: 0,
            student_id: 1,
            date,
            class_type: "Treino".to_string(),
            is_present,
            notes: None,
        }
    }

    #[test]
    fn test_empty_set_is_all_zero() {
        let stats = presentation_stats(&[], date(2024, 6, 15));
        assert_eq!(stats, PresentationStats::default());
    }

    #[test]
    fn test_gender_buckets_keep_unrecognized_values_apart() {
        let today = date(2024, 6, 15);
        let records = vec![
            presentation("Masculino", None, today),
            presentation("Feminino", None, today),
            presentation("masculino", None, today),
            presentation("", None, today),
        ];

        let stats = presentation_stats(&records, today);

        assert_eq!(stats.gender_stats.boys, 1);
        assert_eq!(stats.gender_stats.girls, 1);
        assert_eq!(stats.gender_stats.other, 2);
        assert!(stats.gender_stats.boys + stats.gender_stats.girls <= stats.total_presentations);
        assert_eq!(
            stats.gender_stats.boys + stats.gender_stats.girls + stats.gender_stats.other,
            stats.total_presentations
        );
    }

    #[test]
    fn test_age_brackets_by_days() {
        let today = date(2024, 6, 15);
        let records = vec![
            presentation("Masculino", Some(today - Duration::days(364)), today),
            presentation("Masculino", Some(today - Duration::days(365)), today),
            presentation("Masculino", Some(today - Duration::days(1094)), today),
            presentation("Masculino", Some(today - Duration::days(1095)), today),
            presentation("Masculino", Some(today - Duration::days(2190)), today),
            presentation("Masculino", Some(today + Duration::days(3)), today),
            presentation("Masculino", None, today),
        ];

        let stats = presentation_stats(&records, today);
        let ages = &stats.age_stats;

        assert_eq!(ages.under1_year, 2);
        assert_eq!(ages.age1_to2, 2);
        assert_eq!(ages.age3_to5, 1);
        assert_eq!(ages.over5_years, 1);
        assert_eq!(ages.unknown, 1);
        let with_birth = records.iter().filter(|r| r.birth_date.is_some()).count() as u32;
        assert_eq!(
            ages.under1_year + ages.age1_to2 + ages.age3_to5 + ages.over5_years,
            with_birth
        );
    }

    #[test]
    fn test_months_sum_to_total_and_windows_follow_today() {
        let today = date(2024, 6, 15);
        let records = vec![
            presentation("Feminino", None, date(2024, 6, 1)),
            presentation("Feminino", None, date(2023, 6, 20)),
            presentation("Feminino", None, date(2024, 2, 10)),
            presentation("Feminino", None, date(2022, 12, 25)),
        ];

        let stats = presentation_stats(&records, today);

        assert_eq!(stats.monthly_stats.june, 2);
        assert_eq!(stats.monthly_stats.february, 1);
        assert_eq!(stats.monthly_stats.december, 1);
        assert_eq!(stats.monthly_stats.total(), stats.total_presentations);
        assert_eq!(stats.presentations_this_year, 2);
        assert_eq!(stats.presentations_this_month, 1);
    }

    #[test]
    fn test_certificate_counts() {
        let today = date(2024, 6, 15);
        let mut generated = presentation("Feminino", None, today);
        generated.certificate_generated = true;
        generated.certificate_path = Some("uploads/certificates/x.pdf".to_string());
        let records = vec![generated, presentation("Masculino", None, today)];

        let stats = presentation_stats(&records, today);

        assert_eq!(stats.certificates_generated, 1);
        assert_eq!(stats.pending_certificates, 1);
    }

    #[test]
    fn test_member_stats_distributions_cover_active_members() {
        let today = date(2024, 6, 15);
        let members = vec![
            member(1, true, "Masculino", Some(date(2015, 1, 1))),
            member(2, true, "Feminino", Some(date(1990, 7, 1))),
            member(3, true, "Outro", Some(date(1950, 1, 1))),
            member(4, false, "Masculino", None),
            member(5, true, "Feminino", None),
        ];
        let family: HashMap<i64, u32> = [(1, 2), (2, 0), (4, 5)].into_iter().collect();

        let stats = member_stats(&members, &family, today);

        assert_eq!(stats.total_members, 5);
        assert_eq!(stats.active_members, 4);
        assert_eq!(stats.inactive_members, 1);
        assert_eq!(stats.gender_distribution["Masculino"], 1);
        assert_eq!(stats.gender_distribution["Feminino"], 2);
        assert_eq!(stats.gender_distribution[OTHER_BUCKET], 1);
        assert_eq!(stats.membership_types["Membro"], 4);
        assert_eq!(stats.age_groups.children, 1);
        assert_eq!(stats.age_groups.adults, 1);
        assert_eq!(stats.age_groups.seniors, 1);
        assert_eq!(stats.age_groups.unknown, 1);
        assert_eq!(stats.members_with_family, 1);
        assert_eq!(stats.total_family_members, 2);
    }

    #[test]
    fn test_age_in_years_respects_birthday() {
        assert_eq!(age_in_years(date(2000, 6, 16), date(2024, 6, 15)), Some(23));
        assert_eq!(age_in_years(date(2000, 6, 15), date(2024, 6, 15)), Some(24));
        assert_eq!(age_in_years(date(2025, 1, 1), date(2024, 6, 15)), None);
    }

    #[test]
    fn test_attendance_rate_rounds_and_handles_empty() {
        let today = date(2024, 6, 15);
        let records = vec![
            attendance(today, true),
            attendance(today - Duration::days(2), false),
            attendance(today - Duration::days(3), true),
            attendance(today - Duration::days(20), true),
            attendance(today - Duration::days(60), false),
        ];

        let stats = jiu_jitsu_stats(&[], &[], &records, &[], today);

        assert_eq!(stats.attendance_rate.overall_rate, 60.0);
        assert_eq!(stats.attendance_rate.last_week_rate, 66.67);
        assert_eq!(stats.attendance_rate.last_month_rate, 75.0);

        let empty = jiu_jitsu_stats(&[], &[], &[], &[], today);
        assert_eq!(empty.attendance_rate.overall_rate, 0.0);
    }
}
