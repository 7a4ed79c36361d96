//! Plain-text rendering of page slices

use std::fmt::Write;

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Table};

use binaan_dispatch::ActionLogEntry;

use crate::api::PageInfo;
use crate::features::kurikulum::{KurikulumDetail, KurikulumState};
use crate::features::laporan_anak::{AnakState, ChildDetail};
use crate::features::raport::{RaportDetail, RaportState};
use crate::features::survey::{SurveyDetail, SurveyState};
use crate::features::tutor::{TutorDetail, TutorState};
use crate::features::ActivityRecord;

fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            header
                .iter()
                .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
                .collect::<Vec<_>>(),
        );
    table
}

fn align_right(table: &mut Table, columns: &[usize]) {
    for &index in columns {
        if let Some(column) = table.column_mut(index) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }
}

fn percent(value: f64) -> String {
    format!("{value:.1}%")
}

fn marker(expanded: bool) -> &'static str {
    if expanded { "-" } else { "+" }
}

fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("-")
}

fn footer(out: &mut String, pagination: Option<PageInfo>, loading: bool, error: Option<&str>) {
    if let Some(page) = pagination {
        let _ = writeln!(
            out,
            "Page {}/{} ({} total)",
            page.current_page, page.last_page, page.total
        );
    }
    if loading {
        let _ = writeln!(out, "Loading...");
    }
    if let Some(error) = error {
        let _ = writeln!(out, "Error: {error}");
    }
}

fn activities(records: &[ActivityRecord]) -> Table {
    let mut table = table(&["Tanggal", "Kegiatan", "Materi", "Kehadiran"]);
    for record in records {
        table.add_row(vec![
            Cell::new(record.tanggal.format("%d-%m-%Y")),
            Cell::new(&record.jenis_kegiatan),
            Cell::new(or_dash(record.materi.as_deref())),
            Cell::new(&record.status_kehadiran),
        ]);
    }
    table
}

pub fn kurikulum(state: &KurikulumState) -> String {
    let mut out = String::new();
    let mut rows = table(&["", "ID", "Kurikulum", "Tahun", "Status", "Materi"]);
    align_right(&mut rows, &[1, 3, 5]);
    for item in &state.list.items {
        let expanded = state.expanded.contains(&item.id);
        rows.add_row(vec![
            Cell::new(marker(expanded)),
            Cell::new(item.id),
            Cell::new(&item.nama_kurikulum),
            Cell::new(item.tahun_berlaku),
            Cell::new(item.status),
            Cell::new(item.total_materi.map_or("-".to_string(), |n| n.to_string())),
        ]);
        if expanded {
            rows.add_row(vec![
                Cell::new(""),
                Cell::new(""),
                Cell::new(or_dash(item.deskripsi.as_deref())),
            ]);
        }
    }
    let _ = writeln!(out, "Kurikulum {}", state.filters.year);
    let _ = writeln!(out, "{rows}");
    if let Some(detail) = &state.detail.value {
        out.push_str(&kurikulum_detail(detail));
    }
    footer(&mut out, state.list.pagination, state.is_loading(), state.error());
    out
}

pub fn kurikulum_detail(detail: &KurikulumDetail) -> String {
    let mut out = String::new();
    let k = &detail.kurikulum;
    let _ = writeln!(out, "{} ({}, {})", k.nama_kurikulum, k.tahun_berlaku, k.status);
    if let Some(deskripsi) = &k.deskripsi {
        let _ = writeln!(out, "{deskripsi}");
    }
    let mut materi = table(&["ID", "Materi", "File"]);
    for m in &detail.materi {
        materi.add_row(vec![
            Cell::new(m.id),
            Cell::new(&m.nama_materi),
            Cell::new(or_dash(m.file_url.as_deref())),
        ]);
    }
    let _ = writeln!(out, "{materi}");
    out
}

pub fn anak(state: &AnakState) -> String {
    let mut out = String::new();
    if let Some(summary) = &state.list.summary {
        let _ = writeln!(
            out,
            "{} anak, {} kegiatan, rata-rata kehadiran {}",
            summary.total_children,
            summary.total_activities,
            percent(summary.average_attendance)
        );
    }
    let mut rows = table(&["", "ID", "Nama", "Shelter", "Hadir", "Kegiatan", "Kehadiran"]);
    align_right(&mut rows, &[1, 4, 5, 6]);
    for child in &state.list.items {
        let expanded = state.expanded.contains(&child.id_anak);
        rows.add_row(vec![
            Cell::new(marker(expanded)),
            Cell::new(child.id_anak),
            Cell::new(&child.full_name),
            Cell::new(or_dash(child.shelter_name.as_deref())),
            Cell::new(child.attended),
            Cell::new(child.total_activities),
            Cell::new(percent(child.attendance_percentage)),
        ]);
        if expanded {
            for (month, data) in &child.monthly_data {
                rows.add_row(vec![
                    Cell::new(""),
                    Cell::new(""),
                    Cell::new(format!("  {month}")),
                    Cell::new(""),
                    Cell::new(data.attended),
                    Cell::new(data.total_activities),
                    Cell::new(percent(data.percentage)),
                ]);
            }
        }
    }
    let _ = writeln!(out, "{rows}");
    if let Some(detail) = &state.detail.value {
        out.push_str(&child_detail(detail));
    }
    let loading = state.list.op.loading || state.initialize.loading;
    footer(&mut out, state.list.pagination, loading, state.error());
    out
}

pub fn child_detail(detail: &ChildDetail) -> String {
    format!(
        "{}: hadir {} dari {}\n{}\n",
        detail.child.full_name,
        detail.attended(),
        detail.activities.len(),
        activities(&detail.activities)
    )
}

pub fn raport(state: &RaportState) -> String {
    let mut out = String::new();
    if let Some(summary) = &state.list.summary {
        let _ = writeln!(
            out,
            "{} raport ({} terbit, {} draft)",
            summary.total_raport, summary.published, summary.draft
        );
    }
    if let Some(semester) = state.selected_semester() {
        let _ = writeln!(out, "Semester: {}", semester.nama_semester);
    }
    let mut rows = table(&[
        "", "ID", "Nama", "Semester", "Tahun Ajaran", "Nilai", "Ranking", "Status",
    ]);
    align_right(&mut rows, &[1, 5, 6]);
    for raport in &state.list.items {
        let expanded = state.expanded.contains(&raport.id_raport);
        rows.add_row(vec![
            Cell::new(marker(expanded)),
            Cell::new(raport.id_raport),
            Cell::new(&raport.full_name),
            Cell::new(&raport.semester),
            Cell::new(&raport.tahun_ajaran),
            Cell::new(raport.nilai_rata_rata.map_or("-".to_string(), |n| format!("{n:.2}"))),
            Cell::new(raport.ranking.map_or("-".to_string(), |r| r.to_string())),
            Cell::new(&raport.status),
        ]);
    }
    let _ = writeln!(out, "{rows}");
    if let Some(detail) = &state.detail.value {
        out.push_str(&raport_detail(detail));
    }
    let loading = state.list.op.loading || state.initialize.loading;
    footer(&mut out, state.list.pagination, loading, state.error());
    out
}

pub fn raport_detail(detail: &RaportDetail) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", detail.child.full_name);
    for entry in &detail.raports {
        let average = entry
            .average()
            .map_or("-".to_string(), |a| format!("{a:.2}"));
        let _ = writeln!(
            out,
            "{} {} (rata-rata {average})",
            entry.semester, entry.tahun_ajaran
        );
        let mut grades = table(&["Mata Pelajaran", "Nilai", "Predikat"]);
        align_right(&mut grades, &[1]);
        for nilai in &entry.nilai {
            grades.add_row(vec![
                Cell::new(&nilai.mata_pelajaran),
                Cell::new(nilai.nilai),
                Cell::new(or_dash(nilai.predikat.as_deref())),
            ]);
        }
        let _ = writeln!(out, "{grades}");
    }
    out
}

pub fn tutor(state: &TutorState) -> String {
    let mut out = String::new();
    if let Some(summary) = &state.list.summary {
        let _ = writeln!(
            out,
            "{} tutor, {} kegiatan, rata-rata kehadiran {}",
            summary.total_tutors,
            summary.total_activities,
            percent(summary.average_attendance)
        );
    }
    let mut rows = table(&["", "ID", "Nama", "Mapel", "Hadir", "Kegiatan", "Kehadiran"]);
    align_right(&mut rows, &[1, 4, 5, 6]);
    for tutor in &state.list.items {
        rows.add_row(vec![
            Cell::new(marker(state.expanded.contains(&tutor.id_tutor))),
            Cell::new(tutor.id_tutor),
            Cell::new(&tutor.nama),
            Cell::new(or_dash(tutor.maple.as_deref())),
            Cell::new(tutor.attended),
            Cell::new(tutor.total_activities),
            Cell::new(percent(tutor.attendance_percentage)),
        ]);
    }
    let _ = writeln!(out, "{rows}");
    if let Some(detail) = &state.detail.value {
        out.push_str(&tutor_detail(detail));
    }
    let loading = state.list.op.loading || state.initialize.loading;
    footer(&mut out, state.list.pagination, loading, state.error());
    out
}

pub fn tutor_detail(detail: &TutorDetail) -> String {
    let present = detail.activities.iter().filter(|a| a.is_present()).count();
    format!(
        "{}: hadir {} dari {}\n{}\n",
        detail.tutor.nama,
        present,
        detail.activities.len(),
        activities(&detail.activities)
    )
}

pub fn survey(state: &SurveyState) -> String {
    let mut out = String::new();
    if let Some(stats) = &state.stats.value {
        let _ = writeln!(
            out,
            "{} survey: {} pending, {} layak, {} tidak layak, {} tambah kelayakan",
            stats.total, stats.pending, stats.layak, stats.tidak_layak, stats.tambah_kelayakan
        );
    }
    let mut rows = table(&["", "ID", "Kepala Keluarga", "Shelter", "Status", "Tanggal"]);
    align_right(&mut rows, &[1]);
    for record in &state.list.items {
        let expanded = state.expanded.contains(&record.id_survey);
        rows.add_row(vec![
            Cell::new(marker(expanded)),
            Cell::new(record.id_survey),
            Cell::new(&record.full_name),
            Cell::new(or_dash(record.shelter_name.as_deref())),
            Cell::new(record.status_validasi),
            Cell::new(record.created_at.format("%d-%m-%Y")),
        ]);
        if expanded {
            rows.add_row(vec![
                Cell::new(""),
                Cell::new(""),
                Cell::new(or_dash(record.catatan_validasi.as_deref())),
            ]);
        }
    }
    let _ = writeln!(out, "{rows}");
    if let Some(detail) = &state.detail.value {
        out.push_str(&survey_detail(detail));
    }
    let loading = state.list.op.loading || state.initialize.loading || state.validate.loading;
    footer(&mut out, state.list.pagination, loading, state.error());
    out
}

pub fn survey_detail(detail: &SurveyDetail) -> String {
    let mut out = String::new();
    let record = &detail.record;
    let _ = writeln!(out, "{} ({})", record.full_name, record.status_validasi);
    let _ = writeln!(out, "No. KK: {}", or_dash(detail.no_kk.as_deref()));
    let _ = writeln!(out, "Alamat: {}", or_dash(detail.alamat.as_deref()));
    let _ = writeln!(out, "Penghasilan: {}", or_dash(detail.penghasilan.as_deref()));
    if let Some(jumlah) = detail.jumlah_anak {
        let _ = writeln!(out, "Jumlah anak: {jumlah}");
    }
    if let Some(catatan) = &record.catatan_validasi {
        let _ = writeln!(out, "Catatan: {catatan}");
    }
    out
}

/// Actions recorded by `--log-actions`, oldest first
pub fn action_log(entries: &[ActionLogEntry]) -> String {
    let mut table = table(&["#", "Action", "Phase", "Changed", "Age", "Summary"]);
    for entry in entries {
        let changed = match entry.state_changed {
            Some(true) => "yes",
            Some(false) => "no",
            None => "-",
        };
        table.add_row(vec![
            Cell::new(entry.sequence),
            Cell::new(entry.name),
            Cell::new(entry.phase.map_or("-", |p| p.as_str())),
            Cell::new(changed),
            Cell::new(entry.elapsed_display()),
            Cell::new(&entry.summary),
        ]);
    }
    align_right(&mut table, &[0, 4]);
    table.to_string()
}
