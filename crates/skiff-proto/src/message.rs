//! DNS message representation.
//!
//! A DNS message consists of a header, question section, and three
//! resource record sections (answer, authority, additional). The OPT and
//! TSIG pseudo-records are pulled out of the additional section on parse
//! and written back last on serialization.

use crate::class::{Class, RecordClass};
use crate::compress::CompressionTable;
use crate::edns::Edns;
use crate::error::{Error, Result};
use crate::header::{Header, Section, HEADER_SIZE};
use crate::name::Name;
use crate::options::Options;
use crate::question::Question;
use crate::rcode::ResponseCode;
use crate::rdata::{RData, TSIG};
use crate::record::ResourceRecord;
use crate::rtype::{RecordType, Type};
use crate::tsig::{signing_data, TsigKey};
use crate::wire::{WireReader, WireWriter};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::trace;

/// A complete DNS message.
///
/// DNS messages consist of:
/// - A fixed 12-byte header
/// - A question section (queries)
/// - An answer section (responses to queries)
/// - An authority section (NS records for referrals)
/// - An additional section (related records, plus OPT and TSIG)
///
/// Header counts are kept equal to the section lengths, with OPT and TSIG
/// counted in ARCOUNT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// The message header.
    header: Header,
    /// The question section.
    questions: Vec<Question>,
    /// The answer section.
    answers: Vec<ResourceRecord>,
    /// The authority section.
    authority: Vec<ResourceRecord>,
    /// The additional section (excluding OPT and TSIG).
    additional: Vec<ResourceRecord>,
    /// EDNS(0) data from the OPT pseudo-RR.
    edns: Option<Edns>,
    /// The TSIG record, always written last.
    tsig: Option<ResourceRecord>,
    /// Offset of the TSIG record in the parsed input.
    #[serde(skip)]
    tsig_offset: Option<usize>,
    /// Key and request MAC from the last `sign`, used to MAC each
    /// serialization over the bytes actually written.
    #[serde(skip)]
    signing: Option<Signing>,
}

#[derive(Debug, Clone)]
struct Signing {
    key: TsigKey,
    prior_mac: Option<Vec<u8>>,
}

impl PartialEq for Signing {
    fn eq(&self, other: &Self) -> bool {
        self.key.name() == other.key.name()
            && self.key.algorithm() == other.key.algorithm()
            && self.key.fudge() == other.key.fudge()
            && self.prior_mac == other.prior_mac
    }
}

impl Eq for Signing {}

impl Message {
    /// Creates a new empty message with the given header.
    pub fn new(header: Header) -> Self {
        let mut message = Self {
            header,
            questions: Vec::new(),
            answers: Vec::new(),
            authority: Vec::new(),
            additional: Vec::new(),
            edns: None,
            tsig: None,
            tsig_offset: None,
            signing: None,
        };
        message.sync_counts();
        message
    }

    /// Creates a query message with a random id and RD set.
    pub fn query(question: Question) -> Self {
        let mut message = Self::new(Header::query());
        message.add_question(question);
        message
    }

    /// Creates a response message from a query.
    pub fn response_from(query: &Message) -> Self {
        let mut message = Self::new(Header::response_from(&query.header));
        message.questions = query.questions.clone();
        message.edns = query.edns.as_ref().map(|e| Edns::new().with_udp_size(e.udp_size()));
        message.sync_counts();
        message
    }

    // =========================================================================
    // Header accessors
    // =========================================================================

    /// Returns the message header.
    #[inline]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Returns a mutable reference to the header.
    ///
    /// Counts are recomputed on serialization, so edits to them have no
    /// effect on the output.
    #[inline]
    pub fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }

    /// Returns the message ID.
    #[inline]
    pub fn id(&self) -> u16 {
        self.header.id
    }

    /// Sets the message ID.
    #[inline]
    pub fn set_id(&mut self, id: u16) {
        self.header.id = id;
    }

    /// Returns the full response code, extended by EDNS when present.
    ///
    /// Unassigned values yield `None`; [`rcode_value`](Self::rcode_value)
    /// returns the raw number.
    pub fn rcode(&self) -> Option<ResponseCode> {
        ResponseCode::from_u16(self.rcode_value())
    }

    /// Returns the full 12-bit response code value.
    pub fn rcode_value(&self) -> u16 {
        let extended = self.edns.as_ref().map_or(0, Edns::extended_rcode);
        u16::from(extended) << 4 | u16::from(self.header.rcode())
    }

    /// Sets the response code.
    ///
    /// Codes above 15 need the OPT record; one is added if missing.
    pub fn set_rcode(&mut self, rcode: ResponseCode) -> Result<()> {
        self.header.set_rcode(rcode.header_rcode())?;
        if rcode.is_extended() {
            self.ensure_edns().set_extended_rcode(rcode.extended_rcode());
        } else if let Some(edns) = &mut self.edns {
            edns.set_extended_rcode(0);
        }
        Ok(())
    }

    /// Returns true if this is a query.
    #[inline]
    pub fn is_query(&self) -> bool {
        self.header.is_query()
    }

    /// Returns true if this is a response.
    #[inline]
    pub fn is_response(&self) -> bool {
        self.header.is_response()
    }

    /// Returns true if the message was truncated.
    #[inline]
    pub fn is_truncated(&self) -> bool {
        self.header.is_truncated()
    }

    // =========================================================================
    // Section accessors
    // =========================================================================

    /// Returns the question section.
    #[inline]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Returns the first question if present.
    #[inline]
    pub fn question(&self) -> Option<&Question> {
        self.questions.first()
    }

    /// Returns the answer section.
    #[inline]
    pub fn answers(&self) -> &[ResourceRecord] {
        &self.answers
    }

    /// Returns the authority section.
    #[inline]
    pub fn authority(&self) -> &[ResourceRecord] {
        &self.authority
    }

    /// Returns the additional section (excluding OPT and TSIG).
    #[inline]
    pub fn additional(&self) -> &[ResourceRecord] {
        &self.additional
    }

    /// Returns the records of a section.
    ///
    /// Questions are not records; the question section is always empty
    /// here, see [`questions`](Self::questions).
    pub fn section(&self, section: Section) -> &[ResourceRecord] {
        match section {
            Section::Question => &[],
            Section::Answer => &self.answers,
            Section::Authority => &self.authority,
            Section::Additional => &self.additional,
        }
    }

    fn section_mut(&mut self, section: Section) -> Result<&mut Vec<ResourceRecord>> {
        match section {
            Section::Question => Err(Error::invalid_argument(
                "the question section holds questions, not records",
            )),
            Section::Answer => Ok(&mut self.answers),
            Section::Authority => Ok(&mut self.authority),
            Section::Additional => Ok(&mut self.additional),
        }
    }

    /// Returns the EDNS information if present.
    #[inline]
    pub fn edns(&self) -> Option<&Edns> {
        self.edns.as_ref()
    }

    /// Sets or clears the EDNS information.
    pub fn set_edns(&mut self, edns: Option<Edns>) {
        self.edns = edns;
        self.sync_counts();
    }

    /// Ensures EDNS is present, creating a default one if needed.
    pub fn ensure_edns(&mut self) -> &mut Edns {
        let added = self.edns.is_none();
        if added {
            self.edns = Some(Edns::new());
            self.sync_counts();
        }
        self.edns.get_or_insert_with(Edns::new)
    }

    /// Returns the effective maximum UDP payload: the advertised EDNS size,
    /// or 512 without EDNS.
    pub fn max_payload(&self) -> usize {
        self.edns
            .as_ref()
            .map_or(crate::MAX_UDP_MESSAGE_SIZE, |e| {
                usize::from(e.udp_size()).max(crate::MAX_UDP_MESSAGE_SIZE)
            })
    }

    /// Returns the TSIG record if the message is signed.
    pub fn tsig(&self) -> Option<&ResourceRecord> {
        self.tsig.as_ref()
    }

    /// Returns true if a TSIG record is attached.
    pub fn is_signed(&self) -> bool {
        self.tsig.is_some()
    }

    // =========================================================================
    // Section mutators
    // =========================================================================

    /// Adds a question.
    pub fn add_question(&mut self, question: Question) {
        self.questions.push(question);
        self.sync_counts();
    }

    /// Adds an answer record.
    pub fn add_answer(&mut self, record: ResourceRecord) {
        self.answers.push(record);
        self.sync_counts();
    }

    /// Adds an authority record.
    pub fn add_authority(&mut self, record: ResourceRecord) {
        self.authority.push(record);
        self.sync_counts();
    }

    /// Adds an additional record.
    pub fn add_additional(&mut self, record: ResourceRecord) {
        self.additional.push(record);
        self.sync_counts();
    }

    /// Adds a record to a section.
    ///
    /// An OPT record in the additional section replaces the EDNS data.
    /// TSIG records are attached with [`sign`](Self::sign) instead.
    pub fn add_record(&mut self, section: Section, record: ResourceRecord) -> Result<()> {
        match record.record_type() {
            Some(RecordType::OPT) if section == Section::Additional => {
                self.set_edns(Some(Edns::from_record(&record)?));
                return Ok(());
            }
            Some(RecordType::OPT) => {
                return Err(Error::OptInWrongSection {
                    section: section.name().to_string(),
                })
            }
            Some(RecordType::TSIG) => {
                return Err(Error::invalid_argument("TSIG records are added by signing"))
            }
            _ => {}
        }
        self.section_mut(section)?.push(record);
        self.sync_counts();
        Ok(())
    }

    /// Removes the first record equal to `record`; returns true if found.
    pub fn remove_record(&mut self, section: Section, record: &ResourceRecord) -> bool {
        let Ok(records) = self.section_mut(section) else {
            return false;
        };
        let Some(index) = records.iter().position(|r| r == record) else {
            return false;
        };
        records.remove(index);
        self.sync_counts();
        true
    }

    /// Removes every record of a section; the question section is cleared
    /// too.
    pub fn clear_section(&mut self, section: Section) {
        match section {
            Section::Question => self.questions.clear(),
            Section::Answer => self.answers.clear(),
            Section::Authority => self.authority.clear(),
            Section::Additional => self.additional.clear(),
        }
        self.sync_counts();
    }

    fn sync_counts(&mut self) {
        let clamp = |len: usize| u16::try_from(len).unwrap_or(u16::MAX);
        let pseudo = usize::from(self.edns.is_some()) + usize::from(self.tsig.is_some());
        self.header.set_count(Section::Question, clamp(self.questions.len()));
        self.header.set_count(Section::Answer, clamp(self.answers.len()));
        self.header.set_count(Section::Authority, clamp(self.authority.len()));
        self.header
            .set_count(Section::Additional, clamp(self.additional.len() + pseudo));
    }

    // =========================================================================
    // Response helpers
    // =========================================================================

    /// Returns true if this is an NXDOMAIN response.
    pub fn is_nxdomain(&self) -> bool {
        self.rcode() == Some(ResponseCode::NXDomain)
    }

    /// Returns true if this response indicates no data (NOERROR but no answers).
    pub fn is_nodata(&self) -> bool {
        self.rcode() == Some(ResponseCode::NoError) && self.answers.is_empty()
    }

    /// Returns answer records of a specific type.
    pub fn answers_of_type(&self, rtype: RecordType) -> impl Iterator<Item = &ResourceRecord> {
        self.answers
            .iter()
            .filter(move |r| r.record_type() == Some(rtype))
    }

    /// Returns the first CNAME target in the answers.
    pub fn cname_target(&self) -> Option<&Name> {
        self.answers.iter().find_map(|r| r.rdata().as_cname())
    }

    /// Returns A record addresses from the answers.
    pub fn a_records(&self) -> impl Iterator<Item = std::net::Ipv4Addr> + '_ {
        self.answers.iter().filter_map(|r| r.rdata().as_a())
    }

    /// Returns AAAA record addresses from the answers.
    pub fn aaaa_records(&self) -> impl Iterator<Item = std::net::Ipv6Addr> + '_ {
        self.answers.iter().filter_map(|r| r.rdata().as_aaaa())
    }

    /// Returns the SOA record of the authority section, used for negative
    /// caching.
    pub fn authority_soa(&self) -> Option<&ResourceRecord> {
        self.authority
            .iter()
            .find(|r| r.record_type() == Some(RecordType::SOA))
    }

    // =========================================================================
    // Wire format
    // =========================================================================

    /// Parses a DNS message from wire format.
    pub fn parse(data: &[u8]) -> Result<Self> {
        Self::parse_with(data, &Options::default())
    }

    /// Parses a DNS message, honouring `options`.
    ///
    /// All sections are read through one cursor, so compression pointers
    /// may target any earlier byte. OPT is extracted into [`Edns`]; TSIG
    /// must be the last additional record.
    pub fn parse_with(data: &[u8], options: &Options) -> Result<Self> {
        let mut reader = WireReader::new(data).with_pointer_tracing(options.verbose_compression);
        let header = Header::from_wire(&mut reader)?;

        let qd_count = header.count(Section::Question);
        let mut questions = Vec::with_capacity(usize::from(qd_count).min(16));
        for _ in 0..qd_count {
            questions.push(Question::decode(&mut reader)?);
        }

        let mut answers = Vec::new();
        let mut authority = Vec::new();
        for (section, records) in [
            (Section::Answer, &mut answers),
            (Section::Authority, &mut authority),
        ] {
            for _ in 0..header.count(section) {
                let record = ResourceRecord::decode(&mut reader)?;
                match record.record_type() {
                    Some(RecordType::OPT) => {
                        return Err(Error::OptInWrongSection {
                            section: section.name().to_string(),
                        })
                    }
                    Some(RecordType::TSIG) => return Err(Error::TsigNotLast),
                    _ => records.push(record),
                }
            }
        }

        let ar_count = header.count(Section::Additional);
        let mut additional = Vec::new();
        let mut edns = None;
        let mut tsig = None;
        let mut tsig_offset = None;
        for index in 0..ar_count {
            let start = reader.position();
            let record = ResourceRecord::decode(&mut reader)?;
            match record.record_type() {
                Some(RecordType::OPT) => {
                    if edns.is_some() {
                        return Err(Error::MultipleOptRecords);
                    }
                    let decoded = Edns::from_record(&record)?;
                    if decoded.version() != 0 {
                        return Err(Error::UnsupportedEdnsVersion {
                            version: decoded.version(),
                        });
                    }
                    edns = Some(decoded);
                }
                Some(RecordType::TSIG) => {
                    if index + 1 != ar_count {
                        return Err(Error::TsigNotLast);
                    }
                    tsig = Some(record);
                    tsig_offset = Some(start);
                }
                _ => additional.push(record),
            }
        }

        if !reader.is_empty() {
            trace!(trailing = reader.remaining(), "ignoring bytes after the last section");
        }

        Ok(Self {
            header,
            questions,
            answers,
            authority,
            additional,
            edns,
            tsig,
            tsig_offset,
            signing: None,
        })
    }

    /// Returns the uncompressed wire length of this message.
    pub fn wire_len(&self) -> usize {
        HEADER_SIZE
            + self.questions.iter().map(Question::wire_len).sum::<usize>()
            + self
                .answers
                .iter()
                .chain(&self.authority)
                .chain(&self.additional)
                .chain(&self.tsig)
                .map(ResourceRecord::wire_len)
                .sum::<usize>()
            + self.edns.as_ref().map_or(0, Edns::wire_len)
    }

    /// Serializes the message with no size limit.
    pub fn to_wire(&self) -> Result<Bytes> {
        self.to_wire_with(usize::from(u16::MAX), &Options::default())
    }

    /// Serializes the message into at most `max_size` bytes.
    ///
    /// Header, questions, OPT and TSIG are always written. Records are
    /// appended in section order until one does not fit; it and every
    /// record after it are dropped and TC is set, so trailing additional
    /// records go first, then authority, then answers.
    pub fn to_wire_with(&self, max_size: usize, options: &Options) -> Result<Bytes> {
        self.encode(max_size, options, true)
    }

    fn encode(&self, max_size: usize, options: &Options, with_tsig: bool) -> Result<Bytes> {
        let opt = self.edns.as_ref().map(Edns::to_record).transpose()?;
        let tsig = self.tsig.as_ref().filter(|_| with_tsig);
        let reserve = opt.as_ref().map_or(0, ResourceRecord::wire_len)
            + tsig.map_or(0, ResourceRecord::wire_len);

        let mut writer = WireWriter::new(self.wire_len().min(max_size));
        let mut compression = CompressionTable::new().with_tracing(options.verbose_compression);

        writer.write_bytes(&[0u8; HEADER_SIZE])?;
        for question in &self.questions {
            question.encode(&mut writer, Some(&mut compression))?;
        }

        let fixed = writer.len() + reserve;
        if fixed > max_size {
            return Err(Error::MessageTooLarge {
                size: fixed,
                max_size,
            });
        }
        let budget = max_size - reserve;

        let mut counts = [0u16; 3];
        let mut truncated = false;
        'sections: for (slot, records) in [&self.answers, &self.authority, &self.additional]
            .into_iter()
            .enumerate()
        {
            for record in records {
                let start = writer.position();
                writer.save();
                record.encode(&mut writer, Some(&mut compression), false)?;
                if writer.len() > budget {
                    writer.restore()?;
                    compression.forget_from(start);
                    truncated = true;
                    break 'sections;
                }
                counts[slot] = counts[slot].checked_add(1).ok_or(Error::CountOutOfRange {
                    section: Section::ALL[slot + 1].name(),
                    direction: "overflow",
                })?;
            }
        }

        let mut pseudo = 0;
        if let Some(opt) = &opt {
            opt.encode(&mut writer, None, false)?;
            pseudo += 1;
        }

        let mut header = self.header.clone();
        let question_count = u16::try_from(self.questions.len()).map_err(|_| {
            Error::CountOutOfRange {
                section: Section::Question.name(),
                direction: "overflow",
            }
        })?;
        let additional_count = counts[2].saturating_add(pseudo);
        header.set_count(Section::Question, question_count);
        header.set_count(Section::Answer, counts[0]);
        header.set_count(Section::Authority, counts[1]);
        header.set_count(Section::Additional, additional_count);
        if truncated {
            trace!(max_size, "message truncated");
            header.set_truncated(true);
        }

        let end = writer.position();
        writer.jump(0)?;
        writer.write_bytes(&header.to_wire())?;
        writer.jump(end)?;

        // The header now holds the final counts minus TSIG, which is what
        // the MAC covers.
        if let Some(record) = tsig {
            let record = match &self.signing {
                Some(signing) => seal(record, signing, writer.as_bytes())?,
                None => record.clone(),
            };
            record.encode(&mut writer, None, false)?;
            writer.write_u16_at(10, additional_count.saturating_add(1))?;
        }

        Ok(writer.freeze())
    }

    // =========================================================================
    // TSIG
    // =========================================================================

    /// Signs the message with `key` at the current time.
    ///
    /// `prior_mac` is the request MAC when signing a response. Any earlier
    /// TSIG record is replaced. Returns the MAC over the unlimited wire
    /// form; a serialization that truncates is MACed again over the bytes
    /// it writes, so the record it carries always verifies.
    pub fn sign(&mut self, key: &TsigKey, prior_mac: Option<&[u8]>) -> Result<Vec<u8>> {
        self.sign_at(key, prior_mac, unix_now())
    }

    /// Signs the message with an explicit signing time.
    pub fn sign_at(
        &mut self,
        key: &TsigKey,
        prior_mac: Option<&[u8]>,
        time_signed: u64,
    ) -> Result<Vec<u8>> {
        self.tsig = None;
        self.tsig_offset = None;
        self.signing = None;
        self.sync_counts();

        let unsigned = self.encode(usize::from(u16::MAX), &Options::default(), false)?;
        let mut tsig = TSIG::new(
            key.algorithm(),
            time_signed,
            key.fudge(),
            Vec::new(),
            self.header.id,
            0,
            Vec::new(),
        )?;
        let data = signing_data(prior_mac, &unsigned, key.name(), &tsig)?;
        let mac = key.signer().sign(&data)?;
        tsig = TSIG::new(
            tsig.algorithm().clone(),
            time_signed,
            key.fudge(),
            mac.clone(),
            self.header.id,
            0,
            Vec::new(),
        )?;

        self.tsig = Some(ResourceRecord::new(
            key.name().clone(),
            Type::Known(RecordType::TSIG),
            Class::Known(RecordClass::ANY),
            0,
            RData::TSIG(tsig),
        ));
        self.signing = Some(Signing {
            key: key.clone(),
            prior_mac: prior_mac.map(<[u8]>::to_vec),
        });
        self.sync_counts();
        Ok(mac)
    }

    /// Verifies the TSIG record of a parsed message against the bytes it
    /// was parsed from.
    pub fn verify_tsig(&self, wire: &[u8], key: &TsigKey, prior_mac: Option<&[u8]>) -> Result<()> {
        self.verify_tsig_at(wire, key, prior_mac, unix_now())
    }

    /// Verifies the TSIG record with an explicit current time.
    pub fn verify_tsig_at(
        &self,
        wire: &[u8],
        key: &TsigKey,
        prior_mac: Option<&[u8]>,
        now: u64,
    ) -> Result<()> {
        let (Some(record), Some(offset)) = (&self.tsig, self.tsig_offset) else {
            return Err(Error::TsigMissing);
        };
        let RData::TSIG(tsig) = record.rdata() else {
            return Err(Error::TsigMissing);
        };

        if record.name() != key.name() || tsig.algorithm() != &key.algorithm() {
            return Err(Error::TsigBadKey {
                name: record.name().to_string(),
            });
        }

        let mut unsigned = wire
            .get(..offset)
            .filter(|bytes| bytes.len() >= HEADER_SIZE)
            .ok_or_else(|| Error::buffer_too_short(offset, wire.len()))?
            .to_vec();
        unsigned[0..2].copy_from_slice(&tsig.original_id().to_be_bytes());
        let ar_count = u16::from_be_bytes([unsigned[10], unsigned[11]]).saturating_sub(1);
        unsigned[10..12].copy_from_slice(&ar_count.to_be_bytes());

        let data = signing_data(prior_mac, &unsigned, record.name(), tsig)?;
        if !key.signer().verify(&data, tsig.mac()) {
            return Err(Error::TsigBadSig);
        }

        if now.abs_diff(tsig.time_signed()) > u64::from(tsig.fudge()) {
            return Err(Error::TsigBadTime {
                time_signed: tsig.time_signed(),
                now,
            });
        }

        Ok(())
    }

    // =========================================================================
    // Presentation format
    // =========================================================================

    /// Writes the message the way dig prints it.
    pub fn format_text<W: fmt::Write>(&self, out: &mut W, options: &Options) -> fmt::Result {
        writeln!(out, "{}", self.header)?;
        if self.rcode_value() > 0x0F {
            match self.rcode() {
                Some(rcode) => writeln!(out, ";; extended status: {rcode}")?,
                None => writeln!(out, ";; extended status: {}", self.rcode_value())?,
            }
        }

        if let Some(edns) = &self.edns {
            writeln!(out, "\n;; OPT PSEUDOSECTION:\n{edns}")?;
        }

        writeln!(out, "\n;; QUESTION SECTION:")?;
        for question in &self.questions {
            writeln!(out, ";{question}")?;
        }

        for section in [Section::Answer, Section::Authority, Section::Additional] {
            let records = self.section(section);
            if records.is_empty() {
                continue;
            }
            writeln!(out, "\n;; {section} SECTION:")?;
            for record in records {
                record.format_text(out, options)?;
                writeln!(out)?;
            }
        }

        if let Some(tsig) = &self.tsig {
            writeln!(out, "\n;; TSIG PSEUDOSECTION:")?;
            tsig.format_text(out, options)?;
            writeln!(out)?;
        }

        Ok(())
    }

    /// Returns the dig-style text with the given options.
    pub fn to_text(&self, options: &Options) -> String {
        let mut out = String::new();
        let _ = self.format_text(&mut out, options);
        out
    }
}

/// Recomputes the MAC of `record` over `unsigned`, the message as written
/// so far with ARCOUNT excluding TSIG.
fn seal(record: &ResourceRecord, signing: &Signing, unsigned: &[u8]) -> Result<ResourceRecord> {
    let RData::TSIG(template) = record.rdata() else {
        return Ok(record.clone());
    };
    let mut message = unsigned.to_vec();
    if let Some(id) = message.get_mut(0..2) {
        id.copy_from_slice(&template.original_id().to_be_bytes());
    }
    let data = signing_data(signing.prior_mac.as_deref(), &message, record.name(), template)?;
    let mac = signing.key.signer().sign(&data)?;
    let tsig = TSIG::new(
        template.algorithm().clone(),
        template.time_signed(),
        template.fudge(),
        mac,
        template.original_id(),
        template.error(),
        template.other().to_vec(),
    )?;
    Ok(ResourceRecord::new(
        record.name().clone(),
        record.rtype(),
        record.rclass(),
        record.ttl(),
        RData::TSIG(tsig),
    ))
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs())
}

impl Default for Message {
    fn default() -> Self {
        Self::new(Header::default())
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.format_text(f, &Options::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tsig::{HmacAlgorithm, HmacSigner};
    use std::net::Ipv4Addr;
    use std::sync::Arc;

    fn name(s: &str) -> Name {
        s.parse().unwrap()
    }

    fn response_with_answers(count: u8) -> Message {
        let query = Message::query(Question::a(name("example.com.")));
        let mut response = Message::response_from(&query);
        for i in 0..count {
            response.add_answer(ResourceRecord::a(
                name(&format!("host{i}.example.com.")),
                300,
                Ipv4Addr::new(192, 0, 2, i),
            ));
        }
        response
    }

    fn key() -> TsigKey {
        TsigKey::new(
            name("key.example."),
            Arc::new(HmacSigner::new(HmacAlgorithm::Sha256, b"0123456789abcdef")),
        )
    }

    #[test]
    fn test_query_creation() {
        let msg = Message::query(Question::a(name("example.com.")));

        assert!(msg.is_query());
        assert!(msg.header().recursion_desired());
        assert_eq!(msg.header().count(Section::Question), 1);
        assert!(msg.edns().is_none());
        assert_eq!(msg.max_payload(), 512);
    }

    #[test]
    fn test_response_creation() {
        let query = Message::query(Question::a(name("example.com.")));
        let response = response_with_answers(1);

        assert!(response.is_response());
        assert_eq!(response.questions(), query.questions());
        assert_eq!(response.header().count(Section::Answer), 1);
    }

    #[test]
    fn test_message_roundtrip() {
        let mut original = response_with_answers(3);
        original.set_id(0x1234);
        original.add_authority(ResourceRecord::new(
            name("example.com."),
            Type::Known(RecordType::NS),
            Class::Known(RecordClass::IN),
            3600,
            RData::NS(crate::rdata::NS::new(name("ns1.example.com."))),
        ));
        original.set_edns(Some(Edns::new().with_udp_size(1232)));

        let wire = original.to_wire().unwrap();
        assert!(wire.len() < original.wire_len());

        let parsed = Message::parse(&wire).unwrap();
        assert_eq!(parsed.id(), 0x1234);
        assert_eq!(parsed.answers(), original.answers());
        assert_eq!(parsed.authority(), original.authority());
        assert_eq!(parsed.edns(), original.edns());
        assert_eq!(parsed.header().count(Section::Additional), 1);
        assert_eq!(parsed.max_payload(), 1232);
    }

    #[test]
    fn test_truncation_drops_trailing_records() {
        let mut msg = response_with_answers(100);
        msg.add_additional(ResourceRecord::a(name("extra.example.com."), 60, Ipv4Addr::LOCALHOST));

        let wire = msg.to_wire_with(512, &Options::default()).unwrap();
        assert!(wire.len() <= 512);

        let parsed = Message::parse(&wire).unwrap();
        assert!(parsed.is_truncated());
        assert!(!parsed.answers().is_empty());
        assert!(parsed.answers().len() < 100);
        assert!(parsed.additional().is_empty());
        assert_eq!(parsed.answers(), &msg.answers()[..parsed.answers().len()]);
    }

    #[test]
    fn test_truncation_keeps_opt() {
        let mut msg = response_with_answers(60);
        msg.set_edns(Some(Edns::new()));

        let wire = msg.to_wire_with(512, &Options::default()).unwrap();
        assert!(wire.len() <= 512);
        let parsed = Message::parse(&wire).unwrap();
        assert!(parsed.is_truncated());
        assert!(parsed.edns().is_some());
    }

    #[test]
    fn test_fits_without_truncation() {
        let msg = response_with_answers(2);
        let wire = msg.to_wire_with(512, &Options::default()).unwrap();
        assert!(!Message::parse(&wire).unwrap().is_truncated());
    }

    #[test]
    fn test_question_too_large_for_limit() {
        let msg = Message::query(Question::a(name("example.com.")));
        let err = msg.to_wire_with(20, &Options::default()).unwrap_err();
        assert!(matches!(err, Error::MessageTooLarge { .. }));
    }

    #[test]
    fn test_extended_rcode() {
        let mut msg = response_with_answers(0);
        msg.set_rcode(ResponseCode::BadCookie).unwrap();
        assert!(msg.edns().is_some());
        assert_eq!(msg.header().rcode(), 7);

        let parsed = Message::parse(&msg.to_wire().unwrap()).unwrap();
        assert_eq!(parsed.rcode(), Some(ResponseCode::BadCookie));
        assert_eq!(parsed.rcode_value(), 23);

        msg.set_rcode(ResponseCode::NXDomain).unwrap();
        assert!(msg.is_nxdomain());
        assert_eq!(msg.edns().map(Edns::extended_rcode), Some(0));
    }

    #[test]
    fn test_duplicate_opt_rejected() {
        let mut msg = Message::query(Question::a(name("example.com.")));
        msg.set_edns(Some(Edns::new()));
        let mut wire = msg.to_wire().unwrap().to_vec();

        let opt = Edns::new().to_record().unwrap().to_wire().unwrap();
        wire.extend_from_slice(&opt);
        wire[11] = 2;

        assert!(matches!(Message::parse(&wire), Err(Error::MultipleOptRecords)));
    }

    #[test]
    fn test_opt_outside_additional_rejected() {
        let opt = Edns::new().to_record().unwrap();
        let mut msg = Message::query(Question::a(name("example.com.")));
        assert!(msg.add_record(Section::Answer, opt.clone()).is_err());

        msg.add_record(Section::Additional, opt).unwrap();
        assert!(msg.edns().is_some());
        assert!(msg.additional().is_empty());
    }

    #[test]
    fn test_unsupported_edns_version() {
        let mut edns = Edns::new();
        edns.set_version(1);
        let mut msg = Message::query(Question::a(name("example.com.")));
        msg.set_edns(Some(edns));

        let err = Message::parse(&msg.to_wire().unwrap()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedEdnsVersion { version: 1 }));
        assert!(err.is_wire_parse());
    }

    #[test]
    fn test_truncated_input_is_wire_error() {
        let wire = response_with_answers(2).to_wire().unwrap();
        for len in [5, HEADER_SIZE + 3, wire.len() - 1] {
            assert!(Message::parse(&wire[..len]).unwrap_err().is_wire_parse());
        }
    }

    #[test]
    fn test_add_remove_records() {
        let mut msg = response_with_answers(2);
        let first = msg.answers()[0].clone();

        assert!(msg.remove_record(Section::Answer, &first));
        assert!(!msg.remove_record(Section::Answer, &first));
        assert_eq!(msg.header().count(Section::Answer), 1);
        assert_eq!(msg.section(Section::Answer).len(), 1);

        msg.add_record(Section::Authority, first).unwrap();
        assert_eq!(msg.header().count(Section::Authority), 1);

        msg.clear_section(Section::Answer);
        assert_eq!(msg.header().count(Section::Answer), 0);
        assert!(msg.add_record(Section::Question, msg.authority()[0].clone()).is_err());
    }

    #[test]
    fn test_tsig_sign_verify() {
        let key = key();
        let mut msg = Message::query(Question::a(name("example.com.")));
        msg.sign_at(&key, None, 1_700_000_000).unwrap();
        assert_eq!(msg.header().count(Section::Additional), 1);

        let wire = msg.to_wire().unwrap();
        let parsed = Message::parse(&wire).unwrap();
        assert!(parsed.is_signed());
        parsed
            .verify_tsig_at(&wire, &key, None, 1_700_000_100)
            .unwrap();
    }

    #[test]
    fn test_tsig_response_chain() {
        let key = key();
        let mut query = Message::query(Question::a(name("example.com.")));
        let request_mac = query.sign_at(&key, None, 1_700_000_000).unwrap();

        let mut response = response_with_answers(1);
        response.set_id(query.id());
        response.sign_at(&key, Some(&request_mac), 1_700_000_001).unwrap();

        let wire = response.to_wire().unwrap();
        let parsed = Message::parse(&wire).unwrap();
        parsed
            .verify_tsig_at(&wire, &key, Some(&request_mac), 1_700_000_001)
            .unwrap();
        assert!(matches!(
            parsed.verify_tsig_at(&wire, &key, None, 1_700_000_001),
            Err(Error::TsigBadSig)
        ));
    }

    #[test]
    fn test_tsig_failures() {
        let key = key();
        let mut msg = response_with_answers(1);
        msg.sign_at(&key, None, 1_700_000_000).unwrap();
        let wire = msg.to_wire().unwrap();
        let parsed = Message::parse(&wire).unwrap();

        // Tampered answer address.
        let mut tampered = wire.to_vec();
        let at = tampered
            .windows(4)
            .position(|w| w == [192, 0, 2, 0])
            .unwrap();
        tampered[at + 3] = 99;
        let reparsed = Message::parse(&tampered).unwrap();
        assert!(matches!(
            reparsed.verify_tsig_at(&tampered, &key, None, 1_700_000_000),
            Err(Error::TsigBadSig)
        ));

        assert!(matches!(
            parsed.verify_tsig_at(&wire, &key, None, 1_700_001_000),
            Err(Error::TsigBadTime { .. })
        ));

        let other = TsigKey::new(name("other.example."), key.signer().clone());
        assert!(matches!(
            parsed.verify_tsig_at(&wire, &other, None, 1_700_000_000),
            Err(Error::TsigBadKey { .. })
        ));

        let sha512 = TsigKey::new(
            name("key.example."),
            Arc::new(HmacSigner::new(HmacAlgorithm::Sha512, b"0123456789abcdef")),
        );
        assert!(matches!(
            parsed.verify_tsig_at(&wire, &sha512, None, 1_700_000_000),
            Err(Error::TsigBadKey { .. })
        ));

        let unsigned = response_with_answers(1);
        let wire = unsigned.to_wire().unwrap();
        assert!(matches!(
            Message::parse(&wire).unwrap().verify_tsig(&wire, &key, None),
            Err(Error::TsigMissing)
        ));
    }

    #[test]
    fn test_tsig_truncated_response_verifies() {
        let key = key();
        let mut query = Message::query(Question::a(name("example.com.")));
        let request_mac = query.sign_at(&key, None, 1_700_000_000).unwrap();

        let mut response = response_with_answers(60);
        response.set_id(query.id());
        let full_mac = response
            .sign_at(&key, Some(&request_mac), 1_700_000_001)
            .unwrap();

        let wire = response.to_wire_with(512, &Options::default()).unwrap();
        assert!(wire.len() <= 512);
        let parsed = Message::parse(&wire).unwrap();
        assert!(parsed.is_truncated());
        assert!(parsed.answers().len() < 60);
        assert_eq!(
            parsed.header().count(Section::Additional),
            1,
            "TSIG is the only additional record"
        );
        parsed
            .verify_tsig_at(&wire, &key, Some(&request_mac), 1_700_000_001)
            .unwrap();

        let RData::TSIG(tsig) = parsed.tsig().unwrap().rdata() else {
            panic!("expected TSIG rdata");
        };
        assert_ne!(tsig.mac(), full_mac.as_slice());

        // The unlimited form still carries the MAC `sign_at` returned.
        let wire = response.to_wire().unwrap();
        let parsed = Message::parse(&wire).unwrap();
        let RData::TSIG(tsig) = parsed.tsig().unwrap().rdata() else {
            panic!("expected TSIG rdata");
        };
        assert_eq!(tsig.mac(), full_mac.as_slice());
        parsed
            .verify_tsig_at(&wire, &key, Some(&request_mac), 1_700_000_001)
            .unwrap();
    }

    #[test]
    fn test_tsig_must_be_last() {
        let key = key();
        let mut msg = Message::query(Question::a(name("example.com.")));
        msg.sign_at(&key, None, 1_700_000_000).unwrap();
        let mut wire = msg.to_wire().unwrap().to_vec();

        let extra = ResourceRecord::a(name("x.example."), 0, Ipv4Addr::LOCALHOST)
            .to_wire()
            .unwrap();
        wire.extend_from_slice(&extra);
        wire[11] = 2;

        assert!(matches!(Message::parse(&wire), Err(Error::TsigNotLast)));
    }

    #[test]
    fn test_display() {
        let mut msg = response_with_answers(1);
        msg.set_edns(Some(Edns::new()));
        let text = msg.to_string();

        assert!(text.starts_with(";; ->>HEADER<<- opcode: QUERY, status: NOERROR"));
        assert!(text.contains(";; QUESTION SECTION:\n;example.com.\tIN\tA"));
        assert!(text.contains(";; ANSWER SECTION:\nhost0.example.com.\t300\tIN\tA\t192.0.2.0"));
        assert!(text.contains(";; OPT PSEUDOSECTION:"));
    }
}
