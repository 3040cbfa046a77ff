//! FASTQ k-mer producer: each peer parses the reads starting inside its byte
//! range of the file and emits one tuple per k-mer, labelled with the global
//! read id.

use crate::error::{input_error, io_error, CcError};
use crate::peer::distribution::block_range;
use crate::peer::Peer;
use crate::tuples::{Label, Tuple};
use crate::util::io::get_buf_reader;
use std::collections::VecDeque;
use std::convert::TryFrom;
use std::io::{BufRead, Seek, SeekFrom};

/// Reads the records whose header starts inside this peer's byte range and
/// emits one `(kmer, read_id, read_id)` tuple per k-mer. Collective: read ids
/// are globally consecutive across peers.
pub fn read_kmers(peer: &Peer, path: &str, kmer_len: usize) -> Result<Vec<Tuple>, CcError> {
    assert!(kmer_len >= 1 && kmer_len <= 31, "k-mers must pack into 62 bits");

    let mut reader = get_buf_reader(path)?;
    let file_len = usize::try_from(
        reader
            .get_ref()
            .metadata()
            .map_err(|e| io_error(format!("Could not stat '{}': {}", path, e)))?
            .len(),
    )
    .expect("file size overflow");
    let (begin, end) = block_range(file_len, peer.peers(), peer.rank());

    let reads = parse_reads(&mut reader, path, begin, end)?;

    // global read ids: offset by the read counts of the lower-ranked peers
    let counts = peer.allgather_size(reads.len());
    let offset: usize = counts[..peer.rank()].iter().sum();

    let mask = (1_u64 << (2 * kmer_len)) - 1;
    let mut tuples = Vec::new();
    for (index, read) in reads.iter().enumerate() {
        let read_id = Label::try_from(offset + index).expect("read count overflow");
        let mut value = 0_u64;
        let mut filled = 0_usize;
        for &byte in read.as_bytes() {
            if let Some(code) = encode_base(byte) {
                value = ((value << 2) | code) & mask;
                filled += 1;
                if filled >= kmer_len {
                    tuples.push(Tuple::new(value, read_id, read_id));
                }
            } else {
                // an unknown base breaks every k-mer overlapping it
                value = 0;
                filled = 0;
            }
        }
    }

    if tuples.is_empty() {
        return Err(input_error(format!(
            "peer {} holds no k-mers from '{}'; use fewer peers or longer input",
            peer.rank(),
            path
        )));
    }
    Ok(tuples)
}

/// Collects the sequence line of every record starting in `[begin, end)`.
/// The byte range is first realigned to a record header: an `@` line with a
/// `+` line two below (quality lines may also begin with `@`).
fn parse_reads(
    reader: &mut (impl BufRead + Seek),
    path: &str,
    begin: usize,
    end: usize,
) -> Result<Vec<String>, CcError> {
    // start one byte early: if the range begins mid-line the tail of that
    // line is dropped, and if it begins exactly on a line start only the
    // previous line's newline is consumed
    let scan_from = begin.saturating_sub(1);
    reader
        .seek(SeekFrom::Start(scan_from as u64))
        .map_err(|e| io_error(format!("Could not seek in '{}': {}", path, e)))?;
    let mut position = scan_from;
    if begin > 0 {
        position += read_line(reader, path, &mut String::new())?;
    }

    let mut window: VecDeque<(usize, String)> = VecDeque::new();
    let mut reads = Vec::new();
    let mut aligned = begin == 0;
    loop {
        while window.len() < 4 {
            let mut line = String::new();
            let consumed = read_line(reader, path, &mut line)?;
            if consumed == 0 {
                break;
            }
            window.push_back((position, trimmed(line)));
            position += consumed;
        }
        match window.front() {
            None => break,
            Some(&(start, _)) if start >= end => break,
            Some(_) => {}
        }
        let is_header = window.len() >= 3
            && window[0].1.starts_with('@')
            && window[2].1.starts_with('+');
        if is_header {
            if window.len() < 4 {
                return Err(input_error(format!("truncated FASTQ record in '{}'", path)));
            }
            if window[1].1.len() != window[3].1.len() {
                return Err(input_error(format!(
                    "FASTQ record in '{}' has mismatched sequence and quality lengths",
                    path
                )));
            }
            window.pop_front();
            let (_, sequence) = window.pop_front().expect("window underflow");
            window.pop_front();
            window.pop_front();
            reads.push(sequence);
            aligned = true;
        } else if aligned {
            return Err(input_error(format!("malformed FASTQ record in '{}'", path)));
        } else {
            // still hunting for the first record boundary in this range
            window.pop_front();
        }
    }
    Ok(reads)
}

fn read_line(
    reader: &mut impl BufRead,
    path: &str,
    line: &mut String,
) -> Result<usize, CcError> {
    reader.read_line(line).map_err(|e| io_error(format!("Could not read '{}': {}", path, e)))
}

fn trimmed(mut line: String) -> String {
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    line
}

fn encode_base(byte: u8) -> Option<u64> {
    match byte {
        b'A' | b'a' => Some(0),
        b'C' | b'c' => Some(1),
        b'G' | b'g' => Some(2),
        b'T' | b't' => Some(3),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::read_kmers;
    use crate::peer::PeerGroup;
    use crate::tuples::Tuple;
    use std::io::Write;

    fn write_fastq(name: &str, records: &[(&str, &str)]) -> String {
        let path = std::env::temp_dir().join(name);
        let mut file = std::fs::File::create(&path).expect("temp file");
        for (id, seq) in records {
            writeln!(file, "@{}\n{}\n+\n{}", id, seq, "I".repeat(seq.len())).expect("write");
        }
        path.to_str().expect("temp path").to_owned()
    }

    fn kmers_of(path: String, peers: usize, kmer_len: usize) -> Vec<Tuple> {
        let results = PeerGroup::execute(peers, move |peer| {
            read_kmers(&peer, &path, kmer_len).expect("read failed")
        })
        .expect("peer group failed");
        results.concat()
    }

    #[test]
    fn emits_one_tuple_per_kmer() {
        let path = write_fastq("ccsort_unit_basic.fastq", &[("r0", "ACGTA"), ("r1", "GGGTT")]);
        let tuples = kmers_of(path, 1, 3);
        // 5-base reads hold three 3-mers each
        assert_eq!(tuples.len(), 6);
        assert_eq!(tuples[0].key, 0b00_01_10); // ACG
        assert!(tuples[..3].iter().all(|t| t.next == 0 && t.current == 0));
        assert!(tuples[3..].iter().all(|t| t.next == 1 && t.current == 1));
    }

    #[test]
    fn read_ids_are_global_across_peers() {
        let records: Vec<(String, &str)> =
            (0..8).map(|i| (format!("read{}", i), "ACGTACGTACGT")).collect();
        let borrowed: Vec<(&str, &str)> =
            records.iter().map(|(id, seq)| (id.as_str(), *seq)).collect();
        let path = write_fastq("ccsort_unit_multi.fastq", &borrowed);

        let single = kmers_of(path.clone(), 1, 5);
        let mut spread = kmers_of(path, 3, 5);
        spread.sort_unstable_by_key(|t| (t.current, t.key));
        let mut expected = single;
        expected.sort_unstable_by_key(|t| (t.current, t.key));
        assert_eq!(spread, expected);
    }

    #[test]
    fn unknown_bases_break_kmers() {
        let path = write_fastq("ccsort_unit_n.fastq", &[("r0", "ACGNACG")]);
        let tuples = kmers_of(path, 1, 3);
        // only the two windows on each side of the N survive
        assert_eq!(tuples.len(), 2);
    }
}
